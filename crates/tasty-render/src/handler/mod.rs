//! Style handlers.
//!
//! A handler turns the part of a style map it depends on into CSS. Each
//! handler declares its dependencies through [`StyleHandler::lookup_styles`];
//! the renderer passes it a map restricted to exactly those keys.
//!
//! Three implementations are provided:
//!
//! - [`GenericHandler`]: one CSS property from one style, built by [`create_style`]
//! - [`FnHandler`]: a closure with an explicit dependency list
//! - [`CachedHandler`]: a per-input memo wrapped around any handler
//!
//! # Example
//!
//! ```rust
//! use tasty_parser::StyleParser;
//! use tasty_render::{style_map, Declaration, FnHandler, HandlerOutput, StyleHandler};
//!
//! let fill = FnHandler::new("fill", ["fill"], |styles, parser| {
//!     let Some(value) = styles.get("fill").and_then(|v| v.as_str()) else {
//!         return Ok(None);
//!     };
//!     let color = parser.parse_color(value, false);
//!     Ok(color.color.map(|c| HandlerOutput::from(Declaration::new("background-color", c))))
//! });
//!
//! let parser = StyleParser::new();
//! let output = fill.compute(&style_map! { "fill" => "#purple" }, &parser).unwrap();
//! assert_eq!(
//!     output.unwrap().to_css(),
//!     "background-color: var(--purple-color);\n"
//! );
//! ```

mod generic;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tasty_parser::{CacheStats, EvictionPolicy, StyleCache, StyleParser};

use crate::error::Result;
use crate::value::StyleMap;

pub use generic::{create_style, to_css_property, Converter, GenericHandler};

/// Default number of memoized results per handler.
pub const DEFAULT_HANDLER_CACHE_SIZE: usize = 1_000;

/// Computes CSS for a group of style properties.
pub trait StyleHandler: Send + Sync {
    /// Identity used to run the handler at most once per render.
    fn name(&self) -> &str;

    /// The style map keys this handler reads.
    fn lookup_styles(&self) -> &[String];

    /// Computes CSS from a map holding only [`lookup_styles`](Self::lookup_styles) keys.
    ///
    /// `Ok(None)` contributes nothing. Errors abort the render.
    fn compute(&self, styles: &StyleMap, parser: &StyleParser) -> Result<Option<HandlerOutput>>;
}

/// One CSS declaration, optionally scoped to a nested selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Selector suffix appended to `&`, e.g. `:hover`.
    pub selector: Option<String>,
    pub property: String,
    pub value: String,
}

impl Declaration {
    /// An unscoped declaration.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            selector: None,
            property: property.into(),
            value: value.into(),
        }
    }

    /// Scopes the declaration to `selector`; an empty selector leaves it unscoped.
    pub fn scoped(mut self, selector: impl Into<String>) -> Self {
        let selector = selector.into();
        self.selector = (!selector.is_empty()).then_some(selector);
        self
    }

    fn write_css(&self, out: &mut String) {
        match &self.selector {
            Some(selector) => out.push_str(&format!(
                "&{} {{ {}: {}; }}\n",
                selector, self.property, self.value
            )),
            None => out.push_str(&format!("{}: {};\n", self.property, self.value)),
        }
    }
}

/// What a handler produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HandlerOutput {
    /// A ready CSS fragment.
    Css(String),
    /// Declarations rendered one per line.
    Declarations(Vec<Declaration>),
}

impl HandlerOutput {
    /// Returns true if the output renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            HandlerOutput::Css(css) => css.trim().is_empty(),
            HandlerOutput::Declarations(decls) => decls.is_empty(),
        }
    }

    /// Renders the output as CSS text.
    ///
    /// Fragments are terminated by a newline.
    pub fn to_css(&self) -> String {
        match self {
            HandlerOutput::Css(css) => {
                let mut out = css.clone();
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out
            }
            HandlerOutput::Declarations(decls) => {
                let mut out = String::new();
                for decl in decls {
                    decl.write_css(&mut out);
                }
                out
            }
        }
    }
}

impl From<Declaration> for HandlerOutput {
    fn from(decl: Declaration) -> Self {
        HandlerOutput::Declarations(vec![decl])
    }
}

impl From<Vec<Declaration>> for HandlerOutput {
    fn from(decls: Vec<Declaration>) -> Self {
        HandlerOutput::Declarations(decls)
    }
}

type ComputeFn =
    dyn Fn(&StyleMap, &StyleParser) -> Result<Option<HandlerOutput>> + Send + Sync + 'static;

/// A handler backed by a closure.
pub struct FnHandler {
    name: String,
    lookup_styles: Vec<String>,
    compute: Box<ComputeFn>,
}

impl FnHandler {
    pub fn new<I, S, F>(name: impl Into<String>, lookup_styles: I, compute: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&StyleMap, &StyleParser) -> Result<Option<HandlerOutput>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            lookup_styles: lookup_styles.into_iter().map(Into::into).collect(),
            compute: Box::new(compute),
        }
    }
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .field("lookup_styles", &self.lookup_styles)
            .finish_non_exhaustive()
    }
}

impl StyleHandler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup_styles(&self) -> &[String] {
        &self.lookup_styles
    }

    fn compute(&self, styles: &StyleMap, parser: &StyleParser) -> Result<Option<HandlerOutput>> {
        (self.compute)(styles, parser)
    }
}

/// Memoizes a handler's output per distinct input map.
///
/// The key is the JSON form of the filtered input. Errors are not cached.
pub struct CachedHandler {
    inner: Arc<dyn StyleHandler>,
    cache: Mutex<StyleCache<String, Option<HandlerOutput>>>,
}

impl CachedHandler {
    pub fn new(inner: Arc<dyn StyleHandler>, capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            inner,
            cache: Mutex::new(StyleCache::new(capacity, policy)),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock().stats()
    }

    pub fn clear_cache(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, StyleCache<String, Option<HandlerOutput>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CachedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedHandler")
            .field("name", &self.inner.name())
            .field("cache", &self.cache_stats())
            .finish()
    }
}

impl StyleHandler for CachedHandler {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn lookup_styles(&self) -> &[String] {
        self.inner.lookup_styles()
    }

    fn compute(&self, styles: &StyleMap, parser: &StyleParser) -> Result<Option<HandlerOutput>> {
        let key = serde_json::to_string(styles)?;
        if let Some(hit) = self.lock().get(&key) {
            return Ok(hit);
        }
        let output = self.inner.compute(styles, parser)?;
        self.lock().insert(key, output.clone());
        Ok(output)
    }
}
