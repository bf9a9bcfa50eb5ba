//! Theme color resolution.
//!
//! Theme colors are written `#name` or `#name.opacity`:
//!
//! - `#purple` resolves to `var(--purple-color)`
//! - `#purple.50` resolves to `rgba(var(--purple-color-rgb), 0.5)`
//! - `#current` resolves to `currentColor`, `#inherit` to `inherit`
//!
//! Opacity is an integer percentage clamped into `0..=100`.
//!
//! Inputs that are not hash colors are handled by
//! [`StyleParser::parse_color`](crate::StyleParser::parse_color), which parses
//! the value to find an embedded `rgb()`/`hsl()` call.

use serde::Serialize;

use crate::lexer::Tokenizer;

/// Result of resolving a color value.
///
/// An all-`None` value means the input could not be resolved and no color
/// should be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedColor {
    /// CSS color expression.
    pub color: Option<String>,
    /// Theme color name, for `#name` inputs.
    pub name: Option<String>,
    /// Opacity percentage in `0..=100`.
    pub opacity: Option<u8>,
}

impl ParsedColor {
    /// Returns true if no color was resolved.
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
    }

    /// Returns true for the reserved `current` and `inherit` names.
    pub fn is_reserved(&self) -> bool {
        matches!(self.name.as_deref(), Some("current") | Some("inherit"))
    }
}

/// Resolves a `#name[.opacity]` token.
///
/// Returns `None` when the input does not start with `#` or the name is
/// empty or holds characters outside `[A-Za-z0-9_-]`.
pub fn resolve_hash_color(raw: &str) -> Option<ParsedColor> {
    let body = raw.trim().strip_prefix('#')?;
    let (name, opacity) = match body.split_once('.') {
        Some((name, opacity)) => (name, parse_opacity(opacity)),
        None => (body, 100),
    };
    if name.is_empty() || !name.bytes().all(Tokenizer::is_ident_char) {
        return None;
    }

    let color = match name {
        "current" => "currentColor".to_string(),
        "inherit" => "inherit".to_string(),
        _ if opacity != 100 => format!("rgba(var(--{}-color-rgb), {})", name, alpha(opacity)),
        _ => format!("var(--{}-color)", name),
    };

    Some(ParsedColor {
        color: Some(color),
        name: Some(name.to_string()),
        opacity: Some(opacity),
    })
}

/// Parses the opacity suffix, clamping into `0..=100`.
///
/// A suffix that is not an integer falls back to full opacity.
fn parse_opacity(raw: &str) -> u8 {
    raw.parse::<i64>()
        .map(|n| n.clamp(0, 100) as u8)
        .unwrap_or(100)
}

/// Formats an opacity percentage as a CSS alpha value (`50` -> `0.5`).
pub(crate) fn alpha(opacity: u8) -> String {
    (f64::from(opacity) / 100.0).to_string()
}

/// Adds an alpha channel to an `rgb()`/`hsl()` call.
///
/// Calls that already carry alpha (`rgba()`, `hsla()`) are returned unchanged.
pub(crate) fn with_alpha(color: &str, opacity: u8) -> String {
    for (plain, with_alpha) in [("rgb(", "rgba("), ("hsl(", "hsla(")] {
        let Some(args) = color
            .strip_prefix(plain)
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            continue;
        };
        return if args.contains(',') {
            format!("{}{}, {})", with_alpha, args, alpha(opacity))
        } else {
            format!("{}{} / {})", plain, args, alpha(opacity))
        };
    }
    color.to_string()
}

/// Returns true if the expression is a CSS color function call.
pub(crate) fn is_color_function(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "rgb" | "rgba" | "hsl" | "hsla"
    )
}

/// Extracts the `r, g, b` channel list from an `rgb()`/`rgba()` expression.
///
/// Used to fill `--*-color-rgb` companion properties.
///
/// ```rust
/// use tasty_parser::rgb_channels;
///
/// assert_eq!(rgb_channels("rgba(10, 20, 30, 0.5)").as_deref(), Some("10, 20, 30"));
/// assert_eq!(rgb_channels("hsl(10 20% 30%)"), None);
/// ```
pub fn rgb_channels(color: &str) -> Option<String> {
    let args = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let parts: Vec<&str> = if args.contains(',') {
        args.split(',').map(str::trim).collect()
    } else {
        args.split(['/', ' ']).filter(|p| !p.is_empty()).collect()
    };
    if parts.len() < 3 {
        return None;
    }
    Some(parts[..3].join(", "))
}
