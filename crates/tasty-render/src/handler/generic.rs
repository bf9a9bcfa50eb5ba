//! The generic single-property handler.
//!
//! Any style without a registered handler is rendered by a [`GenericHandler`]:
//! the style name becomes a CSS property and the value is run through the
//! parser.

use std::fmt;
use std::sync::Arc;

use tasty_parser::{rgb_channels, ParseMode, StyleParser};

use super::{Declaration, HandlerOutput, StyleHandler};
use crate::error::Result;
use crate::value::{StyleMap, StyleValue};

/// Turns a non-string style value into style text; `None` cancels the rule.
pub type Converter = Arc<dyn Fn(&StyleValue) -> Option<String> + Send + Sync>;

/// Properties whose bare numbers must stay unitless.
const UNITLESS_PROPERTIES: &[&str] = &[
    "opacity",
    "z-index",
    "order",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "line-height",
    "zoom",
];

/// Properties where `/` is a separator, not division.
const SLASH_PROPERTIES: &[&str] = &["grid-area", "grid-row", "grid-column", "aspect-ratio", "font"];

/// Converts a style name into a CSS property name.
///
/// ```rust
/// use tasty_render::to_css_property;
///
/// assert_eq!(to_css_property("backgroundColor"), "background-color");
/// assert_eq!(to_css_property("z_index"), "z-index");
/// assert_eq!(to_css_property("@card-gap"), "--card-gap");
/// ```
pub fn to_css_property(style_name: &str) -> String {
    if let Some(custom) = style_name.strip_prefix('@') {
        return format!("--{}", custom);
    }
    if style_name.starts_with("--") {
        return style_name.to_string();
    }

    let mut out = String::with_capacity(style_name.len() + 4);
    for ch in style_name.chars() {
        match ch {
            '_' => out.push('-'),
            c if c.is_ascii_uppercase() => {
                if !out.is_empty() {
                    out.push('-');
                }
                out.push(c.to_ascii_lowercase());
            }
            c => out.push(c),
        }
    }
    out
}

/// Builds a handler rendering `style_name` as a single CSS property.
///
/// `css_property` overrides the derived property name. `converter` is
/// applied to values that are not strings.
///
/// ```rust
/// use tasty_parser::StyleParser;
/// use tasty_render::{create_style, style_map, StyleHandler};
///
/// let handler = create_style("gap", None, None);
/// let output = handler
///     .compute(&style_map! { "gap" => "2x" }, &StyleParser::new())
///     .unwrap()
///     .unwrap();
/// assert_eq!(output.to_css(), "gap: calc(2 * var(--gap));\n");
/// ```
pub fn create_style(
    style_name: &str,
    css_property: Option<&str>,
    converter: Option<Converter>,
) -> GenericHandler {
    let property = css_property
        .map(str::to_string)
        .unwrap_or_else(|| to_css_property(style_name));
    GenericHandler {
        lookup_styles: vec![style_name.to_string()],
        property,
        converter,
    }
}

/// Renders one style as one CSS property.
#[derive(Clone)]
pub struct GenericHandler {
    lookup_styles: Vec<String>,
    property: String,
    converter: Option<Converter>,
}

impl fmt::Debug for GenericHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericHandler")
            .field("style", &self.lookup_styles[0])
            .field("property", &self.property)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

impl GenericHandler {
    /// The CSS property this handler emits.
    pub fn property(&self) -> &str {
        &self.property
    }

    fn parse_mode(&self) -> ParseMode {
        let property = self.property.as_str();
        if UNITLESS_PROPERTIES.contains(&property) {
            ParseMode::Default
        } else if SLASH_PROPERTIES.contains(&property) {
            ParseMode::NoAutoCalc
        } else {
            ParseMode::RemInsertion
        }
    }

    fn is_color_property(&self) -> bool {
        self.property.starts_with("--") && self.property.ends_with("-color")
    }

    /// Style text for a single value, or `None` when the rule is cancelled.
    fn text_of(&self, value: &StyleValue) -> Option<String> {
        let text = match (value, &self.converter) {
            (StyleValue::Str(s), _) => s.clone(),
            (StyleValue::Null, _) => return None,
            (other, Some(convert)) => convert(other)?,
            (other, None) => other.literal_text()?,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn declarations(&self, value: &StyleValue, parser: &StyleParser) -> Vec<Declaration> {
        let Some(text) = self.text_of(value) else {
            return Vec::new();
        };
        if self.is_color_property() {
            return self.color_declarations(&text, parser);
        }

        let parsed = parser.parse_style(&text, self.parse_mode());
        if parsed.value.is_empty() {
            return Vec::new();
        }
        vec![Declaration::new(&self.property, parsed.value.as_str())]
    }

    /// Walks conditional branches, appending each key to the enclosing
    /// selector, so `{"[disabled]": {":focus": v}}` scopes `v` to
    /// `[disabled]:focus`.
    fn collect_scoped(
        &self,
        value: &StyleValue,
        selector: &str,
        parser: &StyleParser,
        out: &mut Vec<Declaration>,
    ) {
        match value {
            StyleValue::Conditional(branches) => {
                for (key, branch) in branches {
                    self.collect_scoped(branch, &format!("{}{}", selector, key), parser, out);
                }
            }
            other => out.extend(
                self.declarations(other, parser)
                    .into_iter()
                    .map(|decl| decl.scoped(selector)),
            ),
        }
    }

    /// `--*-color` properties also carry a `-rgb` companion for opacity mixing.
    fn color_declarations(&self, text: &str, parser: &StyleParser) -> Vec<Declaration> {
        let parsed = parser.parse_color(text, true);
        let companion = format!("{}-rgb", self.property);
        let reserved = parsed.is_reserved();

        match (parsed.name, parsed.color) {
            (Some(name), Some(color)) if !reserved => vec![
                Declaration::new(&self.property, color),
                Declaration::new(companion, format!("var(--{}-color-rgb)", name)),
            ],
            (Some(name), color) => {
                let color = color.unwrap_or_else(|| format!("var(--{}-color)", name));
                vec![Declaration::new(&self.property, color)]
            }
            (None, Some(color)) => {
                let channels = rgb_channels(&color);
                let mut decls = vec![Declaration::new(&self.property, color)];
                if let Some(channels) = channels {
                    decls.push(Declaration::new(companion, channels));
                }
                decls
            }
            (None, None) => {
                let parsed = parser.parse_style(text, ParseMode::Default);
                let value = if parsed.value.is_empty() {
                    text.to_string()
                } else {
                    parsed.value.clone()
                };
                vec![Declaration::new(&self.property, value)]
            }
        }
    }
}

impl StyleHandler for GenericHandler {
    fn name(&self) -> &str {
        &self.lookup_styles[0]
    }

    fn lookup_styles(&self) -> &[String] {
        &self.lookup_styles
    }

    fn compute(&self, styles: &StyleMap, parser: &StyleParser) -> Result<Option<HandlerOutput>> {
        let Some(value) = styles.get(&self.lookup_styles[0]) else {
            return Ok(None);
        };

        let mut decls = Vec::new();
        self.collect_scoped(value, "", parser, &mut decls);
        Ok((!decls.is_empty()).then(|| HandlerOutput::Declarations(decls)))
    }
}
