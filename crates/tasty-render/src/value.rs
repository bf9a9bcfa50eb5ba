//! Style map value types.
//!
//! A [`StyleMap`] maps property names to [`StyleValue`]s. Values are literals,
//! responsive arrays (one entry per zone, widest first) or conditional maps
//! keyed by selector.
//!
//! # Example
//!
//! ```rust
//! use tasty_render::{style_map, StyleValue};
//!
//! let styles = style_map! {
//!     "display" => "grid",
//!     "gap" => "1x",
//!     "width" => vec!["100%", "50%"],
//!     "color" => StyleValue::conditional([("", "#dark"), (":hover", "#purple")]),
//! };
//! assert_eq!(styles.len(), 4);
//! assert!(styles["width"].is_responsive());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered map of property name to value.
///
/// Insertion order is preserved so rendered CSS and cache keys are stable.
pub type StyleMap = IndexMap<String, StyleValue>;

/// A single style value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Explicit absence; inside a responsive array it inherits the previous zone.
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// One value per responsive zone, widest zone first.
    Responsive(Vec<StyleValue>),
    /// Selector to value; the empty key is the default branch.
    Conditional(IndexMap<String, StyleValue>),
}

impl StyleValue {
    /// Builds a conditional map from `(selector, value)` pairs.
    pub fn conditional<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<StyleValue>,
    {
        StyleValue::Conditional(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns true for zone-expanded (array) values.
    pub fn is_responsive(&self) -> bool {
        matches!(self, StyleValue::Responsive(_))
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, StyleValue::Null)
    }

    /// The string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of a literal (string or number), used as parser input.
    pub fn literal_text(&self) -> Option<String> {
        match self {
            StyleValue::Str(s) => Some(s.clone()),
            StyleValue::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }
}

/// Formats a number the way it would be written in a style string
/// (`2.0` -> `2`, `0.5` -> `0.5`).
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Str(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Str(s)
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Number(f64::from(n))
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Bool(b)
    }
}

impl<T: Into<StyleValue>> From<Option<T>> for StyleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StyleValue::Null, Into::into)
    }
}

impl<T: Into<StyleValue>> From<Vec<T>> for StyleValue {
    fn from(values: Vec<T>) -> Self {
        StyleValue::Responsive(values.into_iter().map(Into::into).collect())
    }
}

/// Builds a [`StyleMap`] from `name => value` pairs.
#[macro_export]
macro_rules! style_map {
    () => { $crate::StyleMap::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::StyleMap::new();
        $( map.insert(($name).to_string(), $crate::StyleValue::from($value)); )+
        map
    }};
}
