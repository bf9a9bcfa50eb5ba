//! Style value parser.
//!
//! Parsing runs in two passes. The first builds a small syntax tree from the
//! lexer's tokens following this grammar:
//!
//! ```text
//! sequence := item*
//! item     := expr | ','
//! expr     := term (operator term)*
//! term     := number | color | property | word | quoted | url
//!           | function '(' args ')' | '(' sequence ')'
//! args     := sequence (',' sequence)*
//! ```
//!
//! The second pass renders the tree into CSS. Implicit `calc()` insertion is
//! decided there: a parenthesized group, or an expression joined by operators,
//! that is not already inside a calc context gets wrapped in `calc(...)`.
//! `calc`, `min`, `max` and `clamp` open a calc context.
//!
//! Top-level results are then sorted into `mods` (bare keywords), `values`
//! and the `color` slot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, EvictionPolicy, StyleCache};
use crate::color::{self, ParsedColor};
use crate::error::{ParseError, Result};
use crate::lexer::{Token, Tokenizer};
use crate::units::{UnitExpansion, UnitRegistry};

/// Default ceiling of the token cache.
pub const DEFAULT_TOKEN_CACHE_SIZE: usize = 10_000;

/// Keywords that are never collected as mods.
const IGNORE_MODS: &[&str] = &[
    "auto",
    "max-content",
    "min-content",
    "none",
    "subgrid",
    "initial",
];

/// Functions whose arguments are already a calc context.
const MATH_FUNCTIONS: &[&str] = &["calc", "min", "max", "clamp"];

/// How a value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseMode {
    /// Resolve colors, insert implicit `calc()`.
    #[default]
    Default,
    /// Like `Default`, plus bare top-level numbers gain a `rem` suffix.
    RemInsertion,
    /// Never insert implicit `calc()` for groups or operators.
    NoAutoCalc,
    /// Keep hash colors as raw tokens instead of resolving them.
    IgnoreColor,
}

impl ParseMode {
    /// Numeric index of the mode (`0..=3`).
    pub fn index(self) -> u8 {
        match self {
            ParseMode::Default => 0,
            ParseMode::RemInsertion => 1,
            ParseMode::NoAutoCalc => 2,
            ParseMode::IgnoreColor => 3,
        }
    }

    /// Mode for a numeric index, if valid.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ParseMode::Default),
            1 => Some(ParseMode::RemInsertion),
            2 => Some(ParseMode::NoAutoCalc),
            3 => Some(ParseMode::IgnoreColor),
            _ => None,
        }
    }
}

/// A parsed style value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedStyle {
    /// Resolved sub-expressions in encounter order.
    pub values: Vec<String>,
    /// Bare top-level keywords.
    pub mods: Vec<String>,
    /// Mods and values in encounter order.
    pub all: Vec<String>,
    /// The assembled CSS value.
    pub value: String,
    /// Resolved color, or empty.
    pub color: String,
}

impl ParsedStyle {
    /// Returns true if the mod was present.
    pub fn has_mod(&self, name: &str) -> bool {
        self.mods.iter().any(|m| m == name)
    }
}

// ============================================================================
// Syntax tree
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Node<'a> {
    Number { value: &'a str, unit: &'a str },
    Word(&'a str),
    Color(&'a str),
    Property(&'a str),
    Text(&'a str),
    Call { name: &'a str, args: Vec<Vec<Node<'a>>> },
    Group(Vec<Node<'a>>),
    Expr { operands: Vec<Node<'a>>, operators: Vec<char> },
    Comma,
}

/// Why an item list stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Close,
    Comma,
    Eof,
}

/// Deepest call or group nesting the tree builder descends into.
const MAX_NESTING: usize = 128;

struct TreeBuilder<'a> {
    input: &'a str,
    tokens: Vec<(usize, Token<'a>)>,
    pos: usize,
    depth: usize,
    issues: Vec<ParseError>,
}

impl<'a> TreeBuilder<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: Tokenizer::new(input).collect(),
            pos: 0,
            depth: 0,
            issues: Vec::new(),
        }
    }

    fn build(mut self) -> (Vec<Node<'a>>, Vec<ParseError>) {
        let (items, _) = self.parse_items(None, false);
        (items, self.issues)
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).map(|(_, t)| *t)
    }

    fn bump(&mut self) -> Option<(usize, Token<'a>)> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parses items until end of input, a `)` closing `open`, or (when
    /// `split_args`) a `,` separating call arguments.
    fn parse_items(&mut self, open: Option<usize>, split_args: bool) -> (Vec<Node<'a>>, Stop) {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    if let Some(position) = open {
                        self.issues.push(ParseError::UnclosedParen {
                            input: self.input.to_string(),
                            position,
                        });
                    }
                    return (items, Stop::Eof);
                }
                Some(Token::Close) => {
                    let position = self.tokens[self.pos].0;
                    self.pos += 1;
                    if open.is_some() {
                        return (items, Stop::Close);
                    }
                    self.issues.push(ParseError::UnexpectedCloseParen {
                        input: self.input.to_string(),
                        position,
                    });
                }
                Some(Token::Comma) => {
                    self.bump();
                    if split_args {
                        return (items, Stop::Comma);
                    }
                    items.push(Node::Comma);
                }
                Some(_) => {
                    if let Some(expr) = self.parse_expr() {
                        items.push(expr);
                    }
                }
            }
        }
    }

    fn parse_expr(&mut self) -> Option<Node<'a>> {
        let first = self.parse_term()?;
        let mut operands = vec![first];
        let mut operators = Vec::new();

        while let Some(Token::Operator(op)) = self.peek() {
            self.bump();
            operators.push(op);
            match self.peek() {
                None | Some(Token::Close) | Some(Token::Comma) => break,
                Some(_) => {
                    if let Some(term) = self.parse_term() {
                        operands.push(term);
                    }
                }
            }
        }

        if operators.is_empty() {
            operands.pop()
        } else {
            Some(Node::Expr {
                operands,
                operators,
            })
        }
    }

    fn parse_term(&mut self) -> Option<Node<'a>> {
        let (position, token) = self.bump()?;
        let node = match token {
            Token::Number { value, unit } => Node::Number { value, unit },
            Token::Word(w) => Node::Word(w),
            Token::Color(c) => Node::Color(c),
            Token::Property(p) => Node::Property(p),
            Token::Quoted(q) => {
                let terminated = q.len() > 1 && q.ends_with(&q[..1]);
                if !terminated {
                    self.issues.push(ParseError::UnterminatedString {
                        input: self.input.to_string(),
                        position,
                    });
                }
                Node::Text(q)
            }
            Token::Url(text) | Token::Other(text) => Node::Text(text),
            Token::Operator(_) => Node::Text(&self.input[position..position + 1]),
            Token::Function(name) if self.depth >= MAX_NESTING => {
                self.skip_nested(position);
                Node::Call {
                    name,
                    args: vec![Vec::new()],
                }
            }
            Token::Open if self.depth >= MAX_NESTING => {
                self.skip_nested(position);
                Node::Group(Vec::new())
            }
            Token::Function(name) => {
                self.depth += 1;
                let mut args = Vec::new();
                loop {
                    let (arg, stop) = self.parse_items(Some(position), true);
                    args.push(arg);
                    if stop != Stop::Comma {
                        break;
                    }
                }
                self.depth -= 1;
                Node::Call { name, args }
            }
            Token::Open => {
                self.depth += 1;
                let (items, _) = self.parse_items(Some(position), false);
                self.depth -= 1;
                Node::Group(items)
            }
            Token::Close | Token::Comma => return None,
        };
        Some(node)
    }

    /// Consumes an over-nested call or group through its closing `)`
    /// without building it.
    fn skip_nested(&mut self, position: usize) {
        self.issues.push(ParseError::TooDeep {
            input: self.input.to_string(),
            position,
        });
        let mut open = 1usize;
        while let Some((_, token)) = self.bump() {
            match token {
                Token::Function(_) | Token::Open => open += 1,
                Token::Close => {
                    open -= 1;
                    if open == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Ctx<'a> {
    top_level: bool,
    in_calc: bool,
    func: Option<&'a str>,
}

impl Ctx<'_> {
    const TOP: Ctx<'static> = Ctx {
        top_level: true,
        in_calc: false,
        func: None,
    };
}

/// A classified top-level item.
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Mod(String),
    Value(String),
    Color(String),
    Comma,
}

struct CssWriter<'p> {
    units: &'p UnitRegistry,
    mode: ParseMode,
}

impl CssWriter<'_> {
    fn auto_calc(&self) -> bool {
        self.mode != ParseMode::NoAutoCalc
    }

    fn node(&self, node: &Node<'_>, ctx: Ctx<'_>) -> String {
        match node {
            Node::Number { value, unit } => self.number(value, unit, ctx),
            Node::Word(w) => (*w).to_string(),
            Node::Color(raw) => self.hash_color(raw),
            Node::Property(name) if ctx.func == Some("var") => format!("--{}", name),
            Node::Property(name) => format!("var(--{})", name),
            Node::Text(text) => (*text).to_string(),
            Node::Comma => ",".to_string(),
            Node::Call { name, args } => {
                let inner = Ctx {
                    top_level: false,
                    in_calc: ctx.in_calc || is_math_function(name),
                    func: Some(name),
                };
                let args: Vec<String> = args.iter().map(|arg| self.sequence(arg, inner)).collect();
                format!("{}({})", name, args.join(", "))
            }
            Node::Group(items) => {
                let inner = Ctx {
                    top_level: false,
                    in_calc: true,
                    func: None,
                };
                let body = self.sequence(items, inner);
                if ctx.in_calc || !self.auto_calc() {
                    format!("({})", body)
                } else {
                    format!("calc({})", body)
                }
            }
            Node::Expr {
                operands,
                operators,
            } => {
                let wrap = !ctx.in_calc && self.auto_calc();
                let inner = Ctx {
                    top_level: false,
                    in_calc: ctx.in_calc || wrap,
                    func: ctx.func,
                };
                let mut out = String::new();
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(&self.node(operand, inner));
                    if let Some(op) = operators.get(i) {
                        out.push(' ');
                        out.push(*op);
                    }
                }
                if wrap {
                    format!("calc({})", out)
                } else {
                    out
                }
            }
        }
    }

    fn number(&self, value: &str, unit: &str, ctx: Ctx<'_>) -> String {
        if let Some(expanded) = self.units.expand(value, unit) {
            if expanded.starts_with('(') && !ctx.in_calc {
                return format!("calc{}", expanded);
            }
            return expanded;
        }
        let is_zero = value.parse::<f64>().map(|n| n == 0.0).unwrap_or(false);
        if unit.is_empty() && ctx.top_level && self.mode == ParseMode::RemInsertion && !is_zero {
            return format!("{}rem", value);
        }
        format!("{}{}", value, unit)
    }

    fn hash_color(&self, raw: &str) -> String {
        if self.mode == ParseMode::IgnoreColor {
            return raw.to_string();
        }
        color::resolve_hash_color(raw)
            .and_then(|c| c.color)
            .unwrap_or_else(|| raw.to_string())
    }

    /// Renders a sequence, attaching commas to the preceding item.
    fn sequence(&self, items: &[Node<'_>], ctx: Ctx<'_>) -> String {
        let mut out = String::new();
        for item in items {
            if *item == Node::Comma {
                out.truncate(out.trim_end().len());
                out.push(',');
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&self.node(item, ctx));
        }
        out
    }

    fn classify(&self, node: &Node<'_>) -> Item {
        match node {
            Node::Comma => Item::Comma,
            Node::Word(w) if IGNORE_MODS.contains(w) => Item::Value((*w).to_string()),
            Node::Word(w) => Item::Mod((*w).to_string()),
            Node::Color(raw) if self.mode != ParseMode::IgnoreColor => {
                Item::Color(self.hash_color(raw))
            }
            Node::Call { name, .. } if color::is_color_function(name) => {
                Item::Color(self.node(node, Ctx::TOP))
            }
            Node::Call { name, args } if name.eq_ignore_ascii_case("color") => {
                Item::Color(self.color_call(args))
            }
            _ => Item::Value(self.node(node, Ctx::TOP)),
        }
    }

    /// `color(#name.50)` and `color(name.50)` resolve like hash colors; any
    /// other argument is taken as the color text.
    fn color_call(&self, args: &[Vec<Node<'_>>]) -> String {
        if let [arg] = args {
            match arg.as_slice() {
                [Node::Color(raw)] => return self.hash_color(raw),
                [Node::Word(name)] => return self.hash_color(&format!("#{}", name)),
                [Node::Word(name), Node::Number { value, unit: "" }] if value.starts_with('.') => {
                    return self.hash_color(&format!("#{}{}", name, value));
                }
                _ => {}
            }
        }
        let inner = Ctx {
            top_level: false,
            in_calc: false,
            func: Some("color"),
        };
        let args: Vec<String> = args.iter().map(|arg| self.sequence(arg, inner)).collect();
        args.join(", ")
    }

    fn assemble(&self, nodes: &[Node<'_>]) -> ParsedStyle {
        let mut items: Vec<Item> = nodes.iter().map(|n| self.classify(n)).collect();

        // The first color fills the color slot; later ones are plain values.
        let mut seen_color = false;
        for item in items.iter_mut() {
            let Item::Color(c) = item else { continue };
            if seen_color {
                let text = std::mem::take(c);
                *item = Item::Value(text);
            }
            seen_color = true;
        }

        // A keyword between value items continues the value chain.
        let is_value = |item: &Item| matches!(item, Item::Value(_) | Item::Color(_));
        let chained: Vec<usize> = (0..items.len())
            .filter(|&i| {
                matches!(items[i], Item::Mod(_))
                    && items[..i].iter().any(is_value)
                    && items[i + 1..].iter().any(is_value)
            })
            .collect();
        for i in chained {
            if let Item::Mod(word) = &mut items[i] {
                let word = std::mem::take(word);
                items[i] = Item::Value(word);
            }
        }

        let mut parsed = ParsedStyle::default();
        let mut value = String::new();
        for item in items {
            match item {
                Item::Comma => {
                    value.truncate(value.trim_end().len());
                    value.push_str(", ");
                }
                Item::Mod(m) => {
                    value.push_str(&m);
                    value.push(' ');
                    parsed.mods.push(m.clone());
                    parsed.all.push(m);
                }
                Item::Value(v) => {
                    value.push_str(&v);
                    value.push(' ');
                    parsed.values.push(v.clone());
                    parsed.all.push(v);
                }
                Item::Color(c) => parsed.color = c,
            }
        }
        value.push_str(&parsed.color);
        parsed.value = value.trim().to_string();
        parsed
    }
}

fn is_math_function(name: &str) -> bool {
    MATH_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str())
}

// ============================================================================
// Parser
// ============================================================================

/// Parses style values and memoizes the results.
///
/// The parser owns its unit registry and token cache, so separate instances
/// never share state.
///
/// # Example
///
/// ```rust
/// use tasty_parser::{ParseMode, StyleParser};
///
/// let parser = StyleParser::new();
///
/// let parsed = parser.parse_style("1x solid #dark", ParseMode::Default);
/// assert_eq!(parsed.value, "var(--gap) solid var(--dark-color)");
/// assert!(parsed.mods.is_empty());
///
/// let parsed = parser.parse_style("top center", ParseMode::Default);
/// assert_eq!(parsed.mods, vec!["top", "center"]);
///
/// let parsed = parser.parse_style("100% - 2x", ParseMode::Default);
/// assert_eq!(parsed.value, "calc(100% - (2 * var(--gap)))");
/// ```
#[derive(Debug)]
pub struct StyleParser {
    units: UnitRegistry,
    cache: Mutex<StyleCache<(ParseMode, String), Arc<ParsedStyle>>>,
}

impl Default for StyleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleParser {
    /// Creates a parser with the default units and cache settings.
    pub fn new() -> Self {
        Self::with_config(
            UnitRegistry::default(),
            DEFAULT_TOKEN_CACHE_SIZE,
            EvictionPolicy::default(),
        )
    }

    /// Creates a parser with explicit units and cache settings.
    pub fn with_config(units: UnitRegistry, cache_size: usize, policy: EvictionPolicy) -> Self {
        Self {
            units,
            cache: Mutex::new(StyleCache::new(cache_size, policy)),
        }
    }

    /// The unit registry in use.
    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Registers a custom unit and drops cached parses that may be stale.
    pub fn register_unit(
        &mut self,
        suffix: impl Into<String>,
        expansion: impl Into<UnitExpansion>,
    ) {
        let suffix = suffix.into();
        tracing::debug!(unit = %suffix, "registering custom unit");
        self.units.register(suffix, expansion);
        self.clear_cache();
    }

    fn cache(&self) -> MutexGuard<'_, StyleCache<(ParseMode, String), Arc<ParsedStyle>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parses a style value, recovering from unbalanced parentheses.
    ///
    /// Open calls are closed at the end of input and stray `)` are dropped.
    /// Results are memoized per `(mode, value)`.
    pub fn parse_style(&self, value: &str, mode: ParseMode) -> Arc<ParsedStyle> {
        let key = (mode, value.to_string());
        if let Some(parsed) = self.cache().get(&key) {
            return parsed;
        }

        let (nodes, _) = TreeBuilder::new(value.trim()).build();
        let writer = CssWriter {
            units: &self.units,
            mode,
        };
        let parsed = Arc::new(writer.assemble(&nodes));
        self.cache().insert(key, Arc::clone(&parsed));
        parsed
    }

    /// Parses a style value, rejecting unbalanced parentheses and
    /// unterminated strings.
    pub fn try_parse_style(&self, value: &str, mode: ParseMode) -> Result<Arc<ParsedStyle>> {
        let (_, issues) = TreeBuilder::new(value.trim()).build();
        if let Some(issue) = issues.into_iter().next() {
            return Err(issue);
        }
        Ok(self.parse_style(value, mode))
    }

    /// Resolves a color value.
    ///
    /// `#name[.opacity]` is resolved directly. Anything else is parsed to find
    /// an `rgb()`/`hsl()` call, optionally followed by an `N%` opacity.
    /// Unresolvable input logs a warning (debug builds, unless
    /// `ignore_error`) and yields an empty [`ParsedColor`].
    pub fn parse_color(&self, raw: &str, ignore_error: bool) -> ParsedColor {
        let raw = raw.trim();
        if raw.starts_with('#') {
            if let Some(color) = color::resolve_hash_color(raw) {
                return color;
            }
        } else if is_color_keyword(raw) {
            return ParsedColor {
                color: Some(raw.to_string()),
                ..Default::default()
            };
        } else {
            let parsed = self.parse_style(raw, ParseMode::Default);
            if !parsed.color.is_empty() {
                let opacity = parsed
                    .values
                    .iter()
                    .rev()
                    .find_map(|v| v.strip_suffix('%')?.parse::<f64>().ok())
                    .map(|n| n.clamp(0.0, 100.0).round() as u8);
                let color = match opacity {
                    Some(op) => color::with_alpha(&parsed.color, op),
                    None => parsed.color.clone(),
                };
                return ParsedColor {
                    color: Some(color),
                    name: None,
                    opacity,
                };
            }
        }

        if !ignore_error && cfg!(debug_assertions) {
            tracing::warn!(value = raw, "unable to resolve color");
        }
        ParsedColor::default()
    }

    /// Token cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    /// Empties the token cache.
    pub fn clear_cache(&self) {
        self.cache().clear();
    }
}

fn is_color_keyword(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "transparent" | "currentcolor" | "inherit"
    )
}
