//! Responsive zones.
//!
//! Breakpoints are given widest first. `N` breakpoints split the width axis
//! into `N + 1` zones:
//!
//! ```text
//! breakpoints [1200, 640]
//!
//! zone 0: 1200px and up          (min-width: 1200px)
//! zone 1: 640px ..= 1199px       (min-width: 640px) and (max-width: 1199px)
//! zone 2: up to 639px            (max-width: 639px)
//! ```
//!
//! A responsive style value is an array with one entry per zone, in the same
//! widest-first order.

use serde::Serialize;

use crate::value::StyleValue;

/// One breakpoint interval and its media query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    /// Inclusive lower bound in pixels.
    pub min: Option<u32>,
    /// Inclusive upper bound in pixels.
    pub max: Option<u32>,
    /// Media query text; empty for a zone covering every width.
    pub media_query: String,
}

impl Zone {
    /// A zero lower bound is kept but left out of the query, where it would
    /// match every width anyway.
    fn new(min: Option<u32>, max: Option<u32>) -> Self {
        let media_query = [
            min.filter(|&n| n > 0).map(|n| format!("(min-width: {}px)", n)),
            max.map(|n| format!("(max-width: {}px)", n)),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" and ");

        Self {
            min,
            max,
            media_query,
        }
    }

    /// Returns true if a viewport `width` falls into this zone.
    pub fn contains(&self, width: u32) -> bool {
        self.min.map_or(true, |min| width >= min) && self.max.map_or(true, |max| width <= max)
    }

    /// Returns true for a zone covering every width.
    pub fn is_unbounded(&self) -> bool {
        self.media_query.is_empty()
    }
}

/// Builds zones from breakpoints given widest first.
///
/// ```rust
/// use tasty_render::points_to_zones;
///
/// let zones = points_to_zones(&[980]);
/// assert_eq!(zones[0].media_query, "(min-width: 980px)");
/// assert_eq!(zones[1].media_query, "(max-width: 979px)");
/// ```
pub fn points_to_zones(points: &[u32]) -> Vec<Zone> {
    let Some(&last) = points.last() else {
        return vec![Zone::new(None, None)];
    };

    let mut zones = Vec::with_capacity(points.len() + 1);
    zones.push(Zone::new(Some(points[0]), None));
    for pair in points.windows(2) {
        zones.push(Zone::new(Some(pair[1]), pair[0].checked_sub(1)));
    }
    zones.push(match last.checked_sub(1) {
        Some(max) => Zone::new(None, Some(max)),
        // No width lies below a zero breakpoint.
        None => Zone::new(Some(1), Some(0)),
    });
    zones
}

/// Expands a style value to exactly `zone_count` per-zone values.
///
/// - `None` and `Null` stay `None`.
/// - Strings and numbers are repeated for every zone.
/// - Arrays are forward-filled: null slots and a short tail repeat the
///   previous entry; entries beyond `zone_count` are dropped.
/// - Any other value yields an empty vector.
pub fn normalize_style_zones(
    value: Option<&StyleValue>,
    zone_count: usize,
) -> Option<Vec<StyleValue>> {
    match value? {
        StyleValue::Null => None,
        value @ (StyleValue::Str(_) | StyleValue::Number(_)) => {
            Some(vec![value.clone(); zone_count])
        }
        StyleValue::Responsive(items) => {
            let mut filled = Vec::with_capacity(zone_count);
            let mut previous = StyleValue::Null;
            for index in 0..zone_count {
                match items.get(index) {
                    Some(item) if !item.is_null() => {
                        previous = item.clone();
                    }
                    _ => {}
                }
                filled.push(previous.clone());
            }
            Some(filled)
        }
        _ => Some(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod zones {
        use super::*;

        #[test]
        fn no_breakpoints_is_single_unbounded_zone() {
            let zones = points_to_zones(&[]);
            assert_eq!(zones.len(), 1);
            assert!(zones[0].is_unbounded());
            assert_eq!(zones[0].min, None);
            assert_eq!(zones[0].max, None);
        }

        #[test]
        fn single_breakpoint() {
            let zones = points_to_zones(&[980]);
            assert_eq!(
                zones,
                vec![
                    Zone {
                        min: Some(980),
                        max: None,
                        media_query: "(min-width: 980px)".into(),
                    },
                    Zone {
                        min: None,
                        max: Some(979),
                        media_query: "(max-width: 979px)".into(),
                    },
                ]
            );
        }

        #[test]
        fn interior_zone_has_both_bounds() {
            let zones = points_to_zones(&[1200, 640]);
            assert_eq!(zones.len(), 3);
            assert_eq!(
                zones[1].media_query,
                "(min-width: 640px) and (max-width: 1199px)"
            );
            assert_eq!(zones[2].media_query, "(max-width: 639px)");
        }

        #[test]
        fn one_pixel_breakpoint_keeps_zero_bound() {
            let zones = points_to_zones(&[5, 1]);
            let last = &zones[2];
            assert_eq!(last.min, None);
            assert_eq!(last.max, Some(0));
            assert_eq!(last.media_query, "(max-width: 0px)");
            assert!(!last.is_unbounded());
            assert!(last.contains(0));
            assert!(!last.contains(3));
            assert!(zones[1].contains(3));
        }

        #[test]
        fn zero_breakpoint() {
            let zones = points_to_zones(&[5, 0]);
            assert_eq!(zones[1].min, Some(0));
            assert_eq!(zones[1].media_query, "(max-width: 4px)");
            assert!(zones[1].contains(0));

            let last = &zones[2];
            assert!(!last.is_unbounded());
            assert!(!last.contains(0));
            assert_eq!(last.media_query, "(min-width: 1px) and (max-width: 0px)");
        }
    }

    mod normalize {
        use super::*;

        fn strs(values: &[&str]) -> Vec<StyleValue> {
            values.iter().map(|v| StyleValue::from(*v)).collect()
        }

        #[test]
        fn absent_and_null() {
            assert_eq!(normalize_style_zones(None, 3), None);
            assert_eq!(normalize_style_zones(Some(&StyleValue::Null), 3), None);
        }

        #[test]
        fn broadcast() {
            let value = StyleValue::from("10px");
            assert_eq!(
                normalize_style_zones(Some(&value), 3),
                Some(strs(&["10px", "10px", "10px"]))
            );
            let number = StyleValue::from(2);
            assert_eq!(
                normalize_style_zones(Some(&number), 2),
                Some(vec![StyleValue::Number(2.0); 2])
            );
        }

        #[test]
        fn forward_fill() {
            let value = StyleValue::from(vec![Some("a"), None, Some("b")]);
            assert_eq!(
                normalize_style_zones(Some(&value), 4),
                Some(strs(&["a", "a", "b", "b"]))
            );
        }

        #[test]
        fn truncates_long_arrays() {
            let value = StyleValue::from(vec!["a", "b", "c"]);
            assert_eq!(
                normalize_style_zones(Some(&value), 2),
                Some(strs(&["a", "b"]))
            );
        }

        #[test]
        fn other_values_are_empty() {
            let value = StyleValue::Bool(true);
            assert_eq!(normalize_style_zones(Some(&value), 2), Some(Vec::new()));
            let map = StyleValue::conditional([("", "a")]);
            assert_eq!(normalize_style_zones(Some(&map), 2), Some(Vec::new()));
        }
    }

    fn descending_breakpoints() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::btree_set(0u32..5000, 0..6)
            .prop_map(|set| set.into_iter().rev().collect())
    }

    proptest! {
        #[test]
        fn zones_partition_widths(points in descending_breakpoints(), width in 0u32..6000) {
            let zones = points_to_zones(&points);
            prop_assert_eq!(zones.len(), points.len() + 1);
            let matching = zones.iter().filter(|z| z.contains(width)).count();
            prop_assert_eq!(matching, 1, "width {} in zones {:?}", width, zones);
        }

        #[test]
        fn broadcast_law(value in "[a-z0-9]{1,6}", n in 0usize..8) {
            let filled = normalize_style_zones(Some(&StyleValue::from(value.as_str())), n).unwrap();
            prop_assert_eq!(filled.len(), n);
            prop_assert!(filled.iter().all(|v| v.as_str() == Some(value.as_str())));
        }

        #[test]
        fn forward_fill_never_leaves_gaps(
            items in prop::collection::vec(prop::option::of("[a-z]{1,3}"), 1..6),
            n in 1usize..8,
        ) {
            let value = StyleValue::from(items.clone());
            let filled = normalize_style_zones(Some(&value), n).unwrap();
            prop_assert_eq!(filled.len(), n);
            if items[0].is_some() {
                prop_assert!(filled.iter().all(|v| !v.is_null()));
            }
        }
    }
}
