//! # Tasty Render - Style Maps to CSS
//!
//! `tasty-render` compiles declarative style maps into CSS text. Values use the
//! tasty value language from [`tasty_parser`]: custom units, theme colors and
//! implicit `calc()`.
//!
//! ## Core Concepts
//!
//! - [`StyleMap`] / [`StyleValue`]: ordered property map; values may be
//!   responsive arrays or conditional maps keyed by selector
//! - [`Zone`]: one breakpoint interval, built by [`points_to_zones`]
//! - [`StyleHandler`]: turns the styles it looks up into CSS
//! - [`HandlerRegistry`]: handlers by style name, with a generic fallback
//! - [`Renderer`]: runs handlers per zone and caches whole renders
//! - [`StyleEngine`]: owns all of the above, configured by [`EngineConfig`]
//!
//! ## Quick Start
//!
//! ```rust
//! use tasty_render::{style_map, StyleEngine};
//!
//! let engine = StyleEngine::new(); // breakpoint 980px
//!
//! let css = engine
//!     .render_styles(&style_map! {
//!         "display" => "grid",
//!         "width" => vec!["100%", "50%"],
//!     })
//!     .unwrap();
//!
//! assert_eq!(
//!     css,
//!     "outline: none;\n\
//!      display: grid;\n\
//!      @media (min-width: 980px) {\nwidth: 100%;\n}\n\
//!      @media (max-width: 979px) {\nwidth: 50%;\n}\n"
//! );
//! ```
//!
//! ## Custom Handlers
//!
//! A handler may read several styles. It runs once per render no matter how
//! many of its styles are present:
//!
//! ```rust
//! use tasty_render::{style_map, Declaration, FnHandler, StyleEngine};
//!
//! let engine = StyleEngine::builder()
//!     .breakpoints(&[])
//!     .handler(FnHandler::new("inset", ["top", "left"], |styles, parser| {
//!         let side = |name: &str| {
//!             styles
//!                 .get(name)
//!                 .and_then(|v| v.as_str())
//!                 .map(|v| parser.parse_style(v, Default::default()).value.clone())
//!                 .unwrap_or_else(|| "auto".to_string())
//!         };
//!         Ok(Some(Declaration::new("inset", format!("{} {}", side("top"), side("left"))).into()))
//!     }))
//!     .build();
//!
//! let css = engine.render_styles(&style_map! { "top" => "1x", "left" => "0" }).unwrap();
//! assert_eq!(css, "outline: none;\ninset: var(--gap) 0;\n");
//! ```

mod config;
mod engine;
mod error;
mod handler;
mod registry;
mod render;
mod responsive;
mod value;

pub use config::{CacheConfig, EngineConfig, DEFAULT_BREAKPOINTS};
pub use engine::{EngineCacheStats, StyleEngine, StyleEngineBuilder};
pub use error::{Result, StyleError};
pub use handler::{
    create_style, to_css_property, CachedHandler, Converter, Declaration, FnHandler,
    GenericHandler, HandlerOutput, StyleHandler, DEFAULT_HANDLER_CACHE_SIZE,
};
pub use registry::HandlerRegistry;
pub use render::{Renderer, DEFAULT_RENDER_CACHE_SIZE};
pub use responsive::{normalize_style_zones, points_to_zones, Zone};
pub use value::{StyleMap, StyleValue};

pub use tasty_parser::{
    CacheStats, EvictionPolicy, ParseError, ParseMode, ParsedColor, ParsedStyle, StyleParser,
    UnitExpansion, UnitRegistry,
};
