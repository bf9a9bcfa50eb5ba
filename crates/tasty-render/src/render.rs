//! Style map rendering.
//!
//! [`Renderer::render`] turns a style map into CSS text:
//!
//! 1. The JSON of `{styles, responsive}` is looked up in the render cache.
//! 2. Every style resolves to its handlers (generic when none is registered),
//!    each handler running at most once.
//! 3. A handler whose inputs include an array runs once per zone; its
//!    output is collected per zone and wrapped in `@media` blocks.
//! 4. Everything else runs once against the flat input.
//!
//! The output always starts with `outline: none;`. Zone blocks follow the
//! flat declarations, widest zone first.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tasty_parser::{CacheStats, EvictionPolicy, StyleCache, StyleParser};

use crate::error::Result;
use crate::handler::StyleHandler;
use crate::registry::HandlerRegistry;
use crate::responsive::{normalize_style_zones, points_to_zones, Zone};
use crate::value::StyleMap;

/// Default number of cached renders.
pub const DEFAULT_RENDER_CACHE_SIZE: usize = 1_000;

const PREAMBLE: &str = "outline: none;\n";

#[derive(Serialize)]
struct RenderKey<'a> {
    styles: &'a StyleMap,
    responsive: &'a [Zone],
}

/// Renders style maps, memoizing complete results.
#[derive(Debug)]
pub struct Renderer {
    cache: Mutex<StyleCache<String, Arc<str>>>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_CACHE_SIZE, EvictionPolicy::default())
    }
}

impl Renderer {
    pub fn new(cache_size: usize, policy: EvictionPolicy) -> Self {
        Self {
            cache: Mutex::new(StyleCache::new(cache_size, policy)),
        }
    }

    fn cache(&self) -> MutexGuard<'_, StyleCache<String, Arc<str>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Renders `styles` for `zones`.
    ///
    /// An empty `zones` slice renders as a single unbounded zone. Handler
    /// errors propagate and leave the cache untouched.
    pub fn render(
        &self,
        styles: &StyleMap,
        zones: &[Zone],
        registry: &HandlerRegistry,
        parser: &StyleParser,
    ) -> Result<String> {
        let key = serde_json::to_string(&RenderKey {
            styles,
            responsive: zones,
        })?;
        if let Some(css) = self.cache().get(&key) {
            tracing::trace!(styles = styles.len(), "render cache hit");
            return Ok(css.to_string());
        }

        let default_zones;
        let zones = if zones.is_empty() {
            default_zones = points_to_zones(&[]);
            &default_zones[..]
        } else {
            zones
        };

        let mut flat = String::from(PREAMBLE);
        let mut responsive = vec![String::new(); zones.len()];

        for handler in collect_handlers(styles, registry) {
            let input: StyleMap = handler
                .lookup_styles()
                .iter()
                .filter_map(|name| styles.get_key_value(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();

            if !input.values().any(|v| v.is_responsive()) {
                if let Some(output) = handler.compute(&input, parser)? {
                    flat.push_str(&output.to_css());
                }
                continue;
            }

            let per_style: Vec<(&String, Option<Vec<_>>)> = input
                .iter()
                .map(|(name, value)| (name, normalize_style_zones(Some(value), zones.len())))
                .collect();

            for (index, buffer) in responsive.iter_mut().enumerate() {
                let projected: StyleMap = per_style
                    .iter()
                    .filter_map(|(name, values)| {
                        let value = values.as_ref()?.get(index)?;
                        (!value.is_null()).then(|| ((*name).clone(), value.clone()))
                    })
                    .collect();
                if let Some(output) = handler.compute(&projected, parser)? {
                    buffer.push_str(&output.to_css());
                }
            }
        }

        let mut css = flat;
        for (zone, body) in zones.iter().zip(&responsive) {
            if body.is_empty() {
                continue;
            }
            if zone.is_unbounded() {
                css.push_str(body);
            } else {
                css.push_str(&format!("@media {} {{\n{}}}\n", zone.media_query, body));
            }
        }

        self.cache().insert(key, Arc::from(css.as_str()));
        Ok(css)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }
}

/// Handlers for every style, in style order, each at most once.
fn collect_handlers(styles: &StyleMap, registry: &HandlerRegistry) -> Vec<Arc<dyn StyleHandler>> {
    let mut handlers: Vec<Arc<dyn StyleHandler>> = Vec::new();
    for name in styles.keys() {
        for handler in registry.resolve(name) {
            if !handlers.iter().any(|h| Arc::ptr_eq(h, &handler)) {
                handlers.push(handler);
            }
        }
    }
    handlers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StyleError;
    use crate::handler::{Declaration, FnHandler, HandlerOutput};
    use crate::style_map;
    use crate::value::StyleValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn render(styles: &StyleMap, zones: &[Zone], registry: &HandlerRegistry) -> Result<String> {
        Renderer::default().render(styles, zones, registry, &StyleParser::new())
    }

    mod flat {
        use super::*;

        #[test]
        fn preamble_always_present() {
            let css = render(&StyleMap::new(), &[], &HandlerRegistry::default()).unwrap();
            assert_eq!(css, "outline: none;\n");
        }

        #[test]
        fn generic_properties_in_style_order() {
            let styles = style_map! {
                "display" => "grid",
                "gap" => "1x",
            };
            let css = render(&styles, &points_to_zones(&[]), &HandlerRegistry::default()).unwrap();
            assert_eq!(css, "outline: none;\ndisplay: grid;\ngap: var(--gap);\n");
        }

        #[test]
        fn null_values_contribute_nothing() {
            let styles = style_map! { "color" => StyleValue::Null };
            let css = render(&styles, &[], &HandlerRegistry::default()).unwrap();
            assert_eq!(css, "outline: none;\n");
        }

        #[test]
        fn multi_style_handler_runs_once() {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();
            let mut registry = HandlerRegistry::default();
            registry.register(FnHandler::new("inset", ["top", "left"], move |styles, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Some(HandlerOutput::Css(format!("inset-keys: {};", styles.len()))))
            }));

            let styles = style_map! { "top" => "0", "left" => "0" };
            let css = render(&styles, &[], &registry).unwrap();
            assert_eq!(css, "outline: none;\ninset-keys: 2;\n");
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn handler_sees_only_its_lookup_styles() {
            let mut registry = HandlerRegistry::default();
            registry.register(FnHandler::new("fill", ["fill"], |styles, _| {
                assert_eq!(styles.len(), 1);
                Ok(None)
            }));
            let styles = style_map! { "fill" => "#dark", "display" => "block" };
            let css = render(&styles, &[], &registry).unwrap();
            assert_eq!(css, "outline: none;\ndisplay: block;\n");
        }

        #[test]
        fn handler_named_like_another_style_keeps_its_generic() {
            let mut registry = HandlerRegistry::default();
            registry.register(FnHandler::new("display", ["fill"], |styles, _| {
                let fill = styles.get("fill").and_then(|v| v.as_str()).unwrap_or("none");
                Ok(Some(Declaration::new("background", fill).into()))
            }));
            let styles = style_map! { "display" => "grid", "fill" => "red" };
            let css = render(&styles, &[], &registry).unwrap();
            assert_eq!(css, "outline: none;\ndisplay: grid;\nbackground: red;\n");
        }
    }

    mod responsive {
        use super::*;

        #[test]
        fn array_values_split_into_media_blocks() {
            let styles = style_map! { "width" => vec!["100%", "50%"] };
            let zones = points_to_zones(&[980]);
            let css = render(&styles, &zones, &HandlerRegistry::default()).unwrap();
            assert_eq!(
                css,
                "outline: none;\n\
                 @media (min-width: 980px) {\nwidth: 100%;\n}\n\
                 @media (max-width: 979px) {\nwidth: 50%;\n}\n"
            );
        }

        #[test]
        fn forward_filled_zones() {
            let styles = style_map! { "padding" => vec![Some("2x"), None] };
            let zones = points_to_zones(&[1200, 640]);
            let css = render(&styles, &zones, &HandlerRegistry::default()).unwrap();
            assert_eq!(css.matches("padding: calc(2 * var(--gap));").count(), 3);
            assert_eq!(css.matches("@media").count(), 3);
        }

        #[test]
        fn mixed_inputs_project_per_zone() {
            let mut registry = HandlerRegistry::default();
            registry.register(FnHandler::new("box", ["w", "h"], |styles, _| {
                let w = styles.get("w").and_then(|v| v.as_str()).unwrap_or("-");
                let h = styles.get("h").and_then(|v| v.as_str()).unwrap_or("-");
                Ok(Some(Declaration::new("box", format!("{} {}", w, h)).into()))
            }));
            let styles = style_map! { "w" => vec!["1", "2"], "h" => "3" };
            let css = render(&styles, &points_to_zones(&[500]), &registry).unwrap();
            assert!(css.contains("@media (min-width: 500px) {\nbox: 1 3;\n}\n"));
            assert!(css.contains("@media (max-width: 499px) {\nbox: 2 3;\n}\n"));
        }

        #[test]
        fn one_pixel_breakpoint_wraps_the_last_zone() {
            let styles = style_map! { "width" => vec!["100%", "0"] };
            let zones = points_to_zones(&[1]);
            let css = render(&styles, &zones, &HandlerRegistry::default()).unwrap();
            assert_eq!(
                css,
                "outline: none;\n\
                 @media (min-width: 1px) {\nwidth: 100%;\n}\n\
                 @media (max-width: 0px) {\nwidth: 0;\n}\n"
            );
        }

        #[test]
        fn unbounded_zone_is_not_wrapped() {
            let styles = style_map! { "width" => vec!["100%"] };
            let css = render(&styles, &[], &HandlerRegistry::default()).unwrap();
            assert_eq!(css, "outline: none;\nwidth: 100%;\n");
        }
    }

    mod caching {
        use super::*;

        #[test]
        fn second_render_is_cached() {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();
            let mut registry = HandlerRegistry::default();
            registry.register(FnHandler::new("color", ["color"], move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Declaration::new("color", "red").into()))
            }));

            let renderer = Renderer::default();
            let parser = StyleParser::new();
            let zones = points_to_zones(&[980]);
            let first = renderer
                .render(&style_map! { "color" => "#dark" }, &zones, &registry, &parser)
                .unwrap();
            let second = renderer
                .render(&style_map! { "color" => "#dark" }, &zones, &registry, &parser)
                .unwrap();

            assert_eq!(first, second);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert_eq!(renderer.cache_stats().hits, 1);
        }

        #[test]
        fn zones_are_part_of_the_key() {
            let renderer = Renderer::default();
            let parser = StyleParser::new();
            let registry = HandlerRegistry::default();
            let styles = style_map! { "width" => vec!["1px", "2px"] };

            let narrow = renderer
                .render(&styles, &points_to_zones(&[600]), &registry, &parser)
                .unwrap();
            let wide = renderer
                .render(&styles, &points_to_zones(&[900]), &registry, &parser)
                .unwrap();
            assert_ne!(narrow, wide);
            assert_eq!(renderer.cache_stats().hits, 0);
        }

        #[test]
        fn errors_propagate_uncached() {
            let mut registry = HandlerRegistry::default();
            registry.register(FnHandler::new("strict", ["strict"], |_, _| {
                Err(StyleError::handler("strict", "rejected"))
            }));

            let renderer = Renderer::default();
            let parser = StyleParser::new();
            let styles = style_map! { "display" => "flex", "strict" => "x" };
            let err = renderer
                .render(&styles, &[], &registry, &parser)
                .unwrap_err();
            assert!(matches!(err, StyleError::Handler { .. }));
            assert_eq!(renderer.cache_stats().size, 0);
        }
    }
}
