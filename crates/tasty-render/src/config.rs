//! Engine configuration.
//!
//! An [`EngineConfig`] is usually loaded from YAML. Every field is optional:
//!
//! ```yaml
//! breakpoints: [1200, 640]
//! cache:
//!   tokens: 10000
//!   handlers: 1000
//!   renders: 1000
//!   eviction: lru        # or clear-all
//! units:
//!   sp: var(--spacing)
//! ```
//!
//! `units` adds template units on top of the defaults (`x`, `r`, `bw`, ...);
//! a unit with an existing suffix replaces it.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tasty_parser::{EvictionPolicy, DEFAULT_TOKEN_CACHE_SIZE};

use crate::error::{Result, StyleError};
use crate::handler::DEFAULT_HANDLER_CACHE_SIZE;
use crate::render::DEFAULT_RENDER_CACHE_SIZE;

/// Breakpoint used when none are configured.
pub const DEFAULT_BREAKPOINTS: &[u32] = &[980];

/// Cache ceilings and eviction strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Parsed style values.
    pub tokens: usize,
    /// Results per handler.
    pub handlers: usize,
    /// Complete renders.
    pub renders: usize,
    pub eviction: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tokens: DEFAULT_TOKEN_CACHE_SIZE,
            handlers: DEFAULT_HANDLER_CACHE_SIZE,
            renders: DEFAULT_RENDER_CACHE_SIZE,
            eviction: EvictionPolicy::default(),
        }
    }
}

/// Settings for a [`StyleEngine`](crate::StyleEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Breakpoint widths in pixels.
    pub breakpoints: Vec<u32>,
    pub cache: CacheConfig,
    /// Extra template units, suffix to template.
    pub units: IndexMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
            cache: CacheConfig::default(),
            units: IndexMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::Config`] if the document does not match.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tasty_render::EngineConfig;
    ///
    /// let config = EngineConfig::from_yaml("breakpoints: [640, 1200]").unwrap();
    /// assert_eq!(config.breakpoints(), vec![1200, 640]);
    /// assert_eq!(config.cache.renders, 1000);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a configuration file.
    ///
    /// ```rust,ignore
    /// let config = EngineConfig::from_file("./tasty.yaml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StyleError::Load {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Breakpoints widest first, without duplicates or zeros.
    pub fn breakpoints(&self) -> Vec<u32> {
        let mut points: Vec<u32> = self.breakpoints.iter().copied().filter(|&p| p > 0).collect();
        points.sort_unstable_by(|a, b| b.cmp(a));
        points.dedup();
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.breakpoints(), vec![980]);
        assert_eq!(config.cache.tokens, 10_000);
        assert_eq!(config.cache.handlers, 1_000);
        assert_eq!(config.cache.renders, 1_000);
        assert_eq!(config.cache.eviction, EvictionPolicy::Lru);
        assert!(config.units.is_empty());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(EngineConfig::from_yaml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = EngineConfig::from_yaml(
            r#"
cache:
  renders: 50
  eviction: clear-all
units:
  sp: var(--spacing)
"#,
        )
        .unwrap();

        assert_eq!(config.breakpoints(), vec![980]);
        assert_eq!(config.cache.renders, 50);
        assert_eq!(config.cache.tokens, 10_000);
        assert_eq!(config.cache.eviction, EvictionPolicy::ClearAll);
        assert_eq!(config.units["sp"], "var(--spacing)");
    }

    #[test]
    fn test_breakpoints_normalized() {
        let config = EngineConfig::from_yaml("breakpoints: [640, 0, 1200, 640]").unwrap();
        assert_eq!(config.breakpoints(), vec![1200, 640]);
    }

    #[test]
    fn test_no_breakpoints() {
        let config = EngineConfig::from_yaml("breakpoints: []").unwrap();
        assert!(config.breakpoints().is_empty());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = EngineConfig::from_yaml("breakpoints: wide").unwrap_err();
        assert!(matches!(err, StyleError::Config(_)));
    }

    #[test]
    fn test_from_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/tasty.yaml").unwrap_err();
        assert!(matches!(err, StyleError::Load { .. }));
        assert!(err.to_string().contains("/nonexistent/tasty.yaml"));
    }
}
