//! The style engine facade.
//!
//! [`StyleEngine`] owns every piece of state: the parser and its token cache,
//! the handler registry, the renderer and the zones derived from the
//! configured breakpoints. Engines never share caches.
//!
//! # Example
//!
//! ```rust
//! use tasty_render::{style_map, StyleEngine};
//!
//! let engine = StyleEngine::builder().breakpoints(&[]).build();
//! let css = engine
//!     .render_styles(&style_map! { "display" => "grid", "gap" => "1x" })
//!     .unwrap();
//! assert_eq!(css, "outline: none;\ndisplay: grid;\ngap: var(--gap);\n");
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tasty_parser::{
    CacheStats, EvictionPolicy, ParseMode, ParsedColor, ParsedStyle, StyleParser, UnitExpansion,
    UnitRegistry,
};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::handler::{create_style, Converter, GenericHandler, StyleHandler};
use crate::registry::HandlerRegistry;
use crate::render::Renderer;
use crate::responsive::{points_to_zones, Zone};
use crate::value::StyleMap;

/// Statistics for each cache layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineCacheStats {
    pub tokens: CacheStats,
    pub handlers: CacheStats,
    pub renders: CacheStats,
}

/// Parses style values and renders style maps.
pub struct StyleEngine {
    parser: StyleParser,
    registry: HandlerRegistry,
    renderer: Renderer,
    breakpoints: Vec<u32>,
    zones: Vec<Zone>,
}

impl fmt::Debug for StyleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleEngine")
            .field("breakpoints", &self.breakpoints)
            .field("caches", &self.cache_stats())
            .finish_non_exhaustive()
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StyleEngine {
    /// Creates an engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine from a configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> StyleEngineBuilder {
        StyleEngineBuilder::default()
    }

    /// Parses one style value, recovering from malformed parentheses.
    pub fn parse_style(&self, value: &str, mode: ParseMode) -> Arc<ParsedStyle> {
        self.parser.parse_style(value, mode)
    }

    /// Parses one style value, rejecting malformed parentheses.
    pub fn try_parse_style(&self, value: &str, mode: ParseMode) -> Result<Arc<ParsedStyle>> {
        Ok(self.parser.try_parse_style(value, mode)?)
    }

    /// Resolves a color value.
    pub fn parse_color(&self, raw: &str, ignore_error: bool) -> ParsedColor {
        self.parser.parse_color(raw, ignore_error)
    }

    /// The parser, for handlers and callers needing direct access.
    pub fn parser(&self) -> &StyleParser {
        &self.parser
    }

    /// Breakpoints in use, widest first.
    pub fn breakpoints(&self) -> &[u32] {
        &self.breakpoints
    }

    /// Zones derived from the breakpoints.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Renders a style map with the engine's zones.
    pub fn render_styles(&self, styles: &StyleMap) -> Result<String> {
        self.render_styles_with_zones(styles, &self.zones)
    }

    /// Renders a style map with explicit zones.
    pub fn render_styles_with_zones(&self, styles: &StyleMap, zones: &[Zone]) -> Result<String> {
        self.renderer.render(styles, zones, &self.registry, &self.parser)
    }

    /// Builds a generic handler; see [`create_style`].
    pub fn create_style(
        &self,
        style_name: &str,
        css_property: Option<&str>,
        converter: Option<Converter>,
    ) -> GenericHandler {
        create_style(style_name, css_property, converter)
    }

    /// Registers a handler and drops renders that may be stale.
    pub fn register_handler<H: StyleHandler + 'static>(&mut self, handler: H) {
        self.registry.register(handler);
        self.renderer.clear_cache();
    }

    /// Registers a custom unit and drops every cached result.
    pub fn register_unit(
        &mut self,
        suffix: impl Into<String>,
        expansion: impl Into<UnitExpansion>,
    ) {
        self.parser.register_unit(suffix, expansion);
        self.registry.clear_caches();
        self.renderer.clear_cache();
    }

    pub fn cache_stats(&self) -> EngineCacheStats {
        EngineCacheStats {
            tokens: self.parser.cache_stats(),
            handlers: self.registry.cache_stats(),
            renders: self.renderer.cache_stats(),
        }
    }

    /// Empties every cache layer.
    pub fn clear_caches(&self) {
        self.parser.clear_cache();
        self.registry.clear_caches();
        self.renderer.clear_cache();
    }
}

/// Builder for [`StyleEngine`].
#[derive(Default)]
pub struct StyleEngineBuilder {
    config: EngineConfig,
    units: Vec<(String, UnitExpansion)>,
    handlers: Vec<Arc<dyn StyleHandler>>,
}

impl StyleEngineBuilder {
    /// Replaces the configuration. Units and handlers added on the builder are kept.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the breakpoints; order does not matter.
    pub fn breakpoints(mut self, points: &[u32]) -> Self {
        self.config.breakpoints = points.to_vec();
        self
    }

    pub fn eviction(mut self, policy: EvictionPolicy) -> Self {
        self.config.cache.eviction = policy;
        self
    }

    /// Adds a custom unit.
    pub fn unit(mut self, suffix: impl Into<String>, expansion: impl Into<UnitExpansion>) -> Self {
        self.units.push((suffix.into(), expansion.into()));
        self
    }

    /// Adds a handler.
    pub fn handler<H: StyleHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn build(self) -> StyleEngine {
        let cache = &self.config.cache;

        let mut units = UnitRegistry::default();
        for (suffix, template) in &self.config.units {
            units.register(suffix.as_str(), template.as_str());
        }
        for (suffix, expansion) in self.units {
            units.register(suffix, expansion);
        }

        let mut registry = HandlerRegistry::new(cache.handlers, cache.eviction);
        for handler in self.handlers {
            registry.register_arc(handler);
        }

        let breakpoints = self.config.breakpoints();
        let zones = points_to_zones(&breakpoints);
        tracing::debug!(?breakpoints, zones = zones.len(), "style engine ready");

        StyleEngine {
            parser: StyleParser::with_config(units, cache.tokens, cache.eviction),
            registry,
            renderer: Renderer::new(cache.renders, cache.eviction),
            breakpoints,
            zones,
        }
    }
}
