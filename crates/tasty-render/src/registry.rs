//! Handler registry.
//!
//! Maps style names to the handlers that read them. A handler declaring
//! several lookup styles is registered under each of them and shared, so the
//! renderer can de-duplicate it by identity. Styles with no registered handler
//! resolve to a memoized [`GenericHandler`](crate::GenericHandler).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tasty_parser::{CacheStats, EvictionPolicy};

use crate::handler::{create_style, CachedHandler, StyleHandler, DEFAULT_HANDLER_CACHE_SIZE};

/// Registered handlers plus the per-style generic fallbacks.
#[derive(Debug)]
pub struct HandlerRegistry {
    by_style: HashMap<String, Vec<Arc<CachedHandler>>>,
    registered: Vec<Arc<CachedHandler>>,
    generics: Mutex<HashMap<String, Arc<CachedHandler>>>,
    cache_size: usize,
    policy: EvictionPolicy,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLER_CACHE_SIZE, EvictionPolicy::default())
    }
}

impl HandlerRegistry {
    /// Creates an empty registry whose handlers memoize up to `cache_size`
    /// results each.
    pub fn new(cache_size: usize, policy: EvictionPolicy) -> Self {
        Self {
            by_style: HashMap::new(),
            registered: Vec::new(),
            generics: Mutex::new(HashMap::new()),
            cache_size,
            policy,
        }
    }

    /// Registers a handler under every style it looks up.
    ///
    /// Other handlers of the same style keep running; a handler with the same
    /// name replaces the earlier one.
    pub fn register<H: StyleHandler + 'static>(&mut self, handler: H) {
        self.register_arc(Arc::new(handler));
    }

    /// Registers a shared handler.
    pub fn register_arc(&mut self, handler: Arc<dyn StyleHandler>) {
        let cached = Arc::new(CachedHandler::new(handler, self.cache_size, self.policy));
        tracing::debug!(
            handler = cached.name(),
            styles = ?cached.lookup_styles(),
            "registering style handler"
        );
        self.by_style.retain(|_, entry| {
            entry.retain(|h| h.name() != cached.name());
            !entry.is_empty()
        });
        for style in cached.lookup_styles() {
            self.by_style
                .entry(style.clone())
                .or_default()
                .push(Arc::clone(&cached));
        }
        self.registered.retain(|h| h.name() != cached.name());
        self.registered.push(cached);
    }

    /// Returns true if `style` has a registered handler.
    pub fn contains(&self, style: &str) -> bool {
        self.by_style.contains_key(style)
    }

    /// Handlers for `style`, falling back to the generic handler.
    pub fn resolve(&self, style: &str) -> Vec<Arc<dyn StyleHandler>> {
        if let Some(handlers) = self.by_style.get(style) {
            return handlers
                .iter()
                .map(|h| Arc::clone(h) as Arc<dyn StyleHandler>)
                .collect();
        }
        let generic: Arc<dyn StyleHandler> = self.generic(style);
        vec![generic]
    }

    fn generic(&self, style: &str) -> Arc<CachedHandler> {
        let mut generics = self.generics();
        if let Some(handler) = generics.get(style) {
            return Arc::clone(handler);
        }
        let handler = Arc::new(CachedHandler::new(
            Arc::new(create_style(style, None, None)),
            self.cache_size,
            self.policy,
        ));
        generics.insert(style.to_string(), Arc::clone(&handler));
        handler
    }

    fn generics(&self) -> MutexGuard<'_, HashMap<String, Arc<CachedHandler>>> {
        self.generics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handler cache statistics summed over every handler.
    pub fn cache_stats(&self) -> CacheStats {
        let generics = self.generics();
        self.registered
            .iter()
            .chain(generics.values())
            .map(|h| h.cache_stats())
            .fold(CacheStats::default(), |mut total, stats| {
                total.hits += stats.hits;
                total.misses += stats.misses;
                total.size += stats.size;
                total.capacity += stats.capacity;
                total.clears += stats.clears;
                total
            })
    }

    /// Empties every handler's memo.
    pub fn clear_caches(&self) {
        for handler in self.registered.iter().chain(self.generics().values()) {
            handler.clear_cache();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Declaration, FnHandler};
    use crate::style_map;
    use tasty_parser::StyleParser;

    fn inset() -> FnHandler {
        FnHandler::new("inset", ["top", "left"], |styles, _| {
            let top = styles.get("top").and_then(|v| v.as_str()).unwrap_or("0");
            let left = styles.get("left").and_then(|v| v.as_str()).unwrap_or("0");
            Ok(Some(Declaration::new("inset", format!("{} {}", top, left)).into()))
        })
    }

    #[test]
    fn registered_under_every_lookup_style() {
        let mut registry = HandlerRegistry::default();
        registry.register(inset());

        assert!(registry.contains("top"));
        assert!(registry.contains("left"));
        let top = registry.resolve("top");
        let left = registry.resolve("left");
        assert_eq!(top.len(), 1);
        assert!(Arc::ptr_eq(&top[0], &left[0]));
    }

    #[test]
    fn unknown_style_gets_memoized_generic() {
        let registry = HandlerRegistry::default();
        let first = registry.resolve("display");
        let second = registry.resolve("display");
        assert_eq!(first[0].name(), "display");
        assert!(Arc::ptr_eq(&first[0], &second[0]));
    }

    #[test]
    fn reregistering_replaces_by_name() {
        let mut registry = HandlerRegistry::default();
        registry.register(inset());
        registry.register(inset());
        assert_eq!(registry.resolve("top").len(), 1);
    }

    #[test]
    fn reregistering_drops_styles_no_longer_read() {
        let mut registry = HandlerRegistry::default();
        registry.register(inset());
        registry.register(FnHandler::new("inset", ["top"], |_, _| Ok(None)));

        assert!(registry.contains("top"));
        assert!(!registry.contains("left"));
        let left = registry.resolve("left");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name(), "left");
    }

    #[test]
    fn stats_and_clear() {
        let registry = HandlerRegistry::default();
        let parser = StyleParser::new();
        let handlers = registry.resolve("display");
        let handler = &handlers[0];
        let styles = style_map! { "display" => "grid" };

        handler.compute(&styles, &parser).unwrap();
        handler.compute(&styles, &parser).unwrap();
        let stats = registry.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.size, 1);

        registry.clear_caches();
        assert_eq!(registry.cache_stats().size, 0);
    }
}
