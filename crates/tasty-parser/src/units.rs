//! Custom unit registry.
//!
//! Custom units are short suffixes that expand into expressions over theme
//! custom properties: `2x` becomes `(2 * var(--gap))`. A unit expands either
//! through a string template or through a function of the numeric argument.
//!
//! ```rust
//! use tasty_parser::{UnitExpansion, UnitRegistry};
//!
//! let mut units = UnitRegistry::default();
//! units.register("cols", UnitExpansion::function(|n| format!("repeat({n}, 1fr)")));
//!
//! assert_eq!(units.expand("2", "x").as_deref(), Some("(2 * var(--gap))"));
//! assert_eq!(units.expand("3", "cols").as_deref(), Some("repeat(3, 1fr)"));
//! assert_eq!(units.expand("3", "px"), None);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

/// Signature of function-based unit expansions.
pub type UnitFn = dyn Fn(&str) -> String + Send + Sync;

/// How a custom unit expands.
#[derive(Clone)]
pub enum UnitExpansion {
    /// `N` becomes `(N * template)`, or just `template` when `N` is `1`.
    Template(String),
    /// `N` becomes whatever the function returns, inserted verbatim.
    Function(Arc<UnitFn>),
}

impl UnitExpansion {
    /// Creates a function-based expansion.
    pub fn function(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        UnitExpansion::Function(Arc::new(f))
    }
}

impl fmt::Debug for UnitExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitExpansion::Template(t) => f.debug_tuple("Template").field(t).finish(),
            UnitExpansion::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<&str> for UnitExpansion {
    fn from(template: &str) -> Self {
        UnitExpansion::Template(template.to_string())
    }
}

impl From<String> for UnitExpansion {
    fn from(template: String) -> Self {
        UnitExpansion::Template(template)
    }
}

static DEFAULT_UNITS: Lazy<HashMap<String, UnitExpansion>> = Lazy::new(|| {
    let mut units = HashMap::new();
    for (suffix, template) in [
        ("x", "var(--gap)"),
        ("r", "var(--radius)"),
        ("bw", "var(--border-width)"),
        ("ow", "var(--outline-width)"),
        ("fs", "var(--font-size)"),
        ("lh", "var(--line-height)"),
        ("rp", "var(--rem-pixel)"),
        ("wh", "var(--window-height)"),
        ("gp", "var(--column-gap)"),
    ] {
        units.insert(suffix.to_string(), UnitExpansion::from(template));
    }
    units.insert(
        "sf".to_string(),
        UnitExpansion::function(|n| format!("minmax(0, {n}fr)")),
    );
    units
});

/// Table of custom unit suffixes.
///
/// [`UnitRegistry::default`] carries the built-in theme units. Use
/// [`UnitRegistry::empty`] to start from nothing.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<String, UnitExpansion>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self {
            units: DEFAULT_UNITS.clone(),
        }
    }
}

impl UnitRegistry {
    /// Creates a registry with no units at all.
    pub fn empty() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Registers (or replaces) a unit suffix.
    pub fn register(&mut self, suffix: impl Into<String>, expansion: impl Into<UnitExpansion>) {
        self.units.insert(suffix.into(), expansion.into());
    }

    /// Returns true if the suffix is a registered custom unit.
    pub fn contains(&self, suffix: &str) -> bool {
        self.units.contains_key(suffix)
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no units are registered.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Expands `value` with the given unit suffix.
    ///
    /// Returns `None` when the suffix is not a custom unit, in which case the
    /// caller passes the literal through unchanged.
    pub fn expand(&self, value: &str, suffix: &str) -> Option<String> {
        match self.units.get(suffix)? {
            UnitExpansion::Template(template) if value == "1" => Some(template.clone()),
            UnitExpansion::Template(template) => Some(format!("({} * {})", value, template)),
            UnitExpansion::Function(f) => Some(f(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_units_present() {
        let units = UnitRegistry::default();
        for suffix in ["x", "r", "bw", "ow", "fs", "lh", "rp", "wh"] {
            assert!(units.contains(suffix), "missing unit {}", suffix);
        }
    }

    #[test]
    fn test_expand_one_is_bare_template() {
        let units = UnitRegistry::default();
        assert_eq!(units.expand("1", "bw").as_deref(), Some("var(--border-width)"));
    }

    #[test]
    fn test_expand_multiplies() {
        let units = UnitRegistry::default();
        assert_eq!(units.expand("1.5", "r").as_deref(), Some("(1.5 * var(--radius))"));
        assert_eq!(units.expand("-2", "x").as_deref(), Some("(-2 * var(--gap))"));
    }

    #[test]
    fn test_function_unit() {
        let units = UnitRegistry::default();
        assert_eq!(units.expand("2", "sf").as_deref(), Some("minmax(0, 2fr)"));
    }

    #[test]
    fn test_unknown_unit() {
        let units = UnitRegistry::default();
        assert_eq!(units.expand("10", "px"), None);
        assert_eq!(units.expand("10", ""), None);
    }

    #[test]
    fn test_register_overrides() {
        let mut units = UnitRegistry::empty();
        assert!(units.is_empty());
        units.register("x", "8px");
        assert_eq!(units.expand("3", "x").as_deref(), Some("(3 * 8px)"));
        units.register("x", "var(--space)");
        assert_eq!(units.len(), 1);
        assert_eq!(units.expand("1", "x").as_deref(), Some("var(--space)"));
    }
}
