use proptest::prelude::*;
use tasty_parser::{EvictionPolicy, ParseMode, StyleParser, UnitRegistry};

fn any_mode() -> impl Strategy<Value = ParseMode> {
    (0u8..4).prop_map(|i| ParseMode::from_index(i).unwrap())
}

// Strategy for style-ish values: numbers with units, words, colors, operators
// and parens, including unbalanced ones.
fn style_value() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        "[0-9]{1,3}(x|r|bw|px|%)?",
        "[a-z]{1,6}",
        "#[a-z]{1,5}(\\.[0-9]{1,3})?",
        "@[a-z]{1,5}",
        Just("+".to_string()),
        Just("-".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just(",".to_string()),
        Just("calc(".to_string()),
    ];
    prop::collection::vec(token, 0..8).prop_map(|tokens| tokens.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn parse_is_idempotent(value in style_value(), mode in any_mode()) {
        let parser = StyleParser::new();
        let first = parser.parse_style(&value, mode);
        let second = parser.parse_style(&value, mode);
        prop_assert_eq!(&*first, &*second);

        // A cold parser computes the same result as the cached one.
        let cold = StyleParser::new().parse_style(&value, mode);
        prop_assert_eq!(&*first, &*cold);
    }

    #[test]
    fn recovered_output_is_balanced(value in style_value()) {
        let parsed = StyleParser::new().parse_style(&value, ParseMode::Default);
        let opens = parsed.value.matches('(').count();
        let closes = parsed.value.matches(')').count();
        prop_assert_eq!(opens, closes, "unbalanced output {:?} for {:?}", parsed.value, value);
    }

    #[test]
    fn all_is_mods_and_values(value in style_value()) {
        let parsed = StyleParser::new().parse_style(&value, ParseMode::Default);
        prop_assert_eq!(parsed.all.len(), parsed.mods.len() + parsed.values.len());
    }

    #[test]
    fn opacity_always_clamped(name in "[a-z]{1,8}", opacity in -500i64..500) {
        let parser = StyleParser::new();
        let color = parser.parse_color(&format!("#{}.{}", name, opacity), true);
        let resolved = color.opacity.unwrap();
        prop_assert!(resolved <= 100);
        prop_assert_eq!(i64::from(resolved), opacity.clamp(0, 100));
    }

    #[test]
    fn clear_all_cache_stays_bounded(values in prop::collection::vec("[a-z]{1,4} [0-9]{1,2}x", 1..40)) {
        let parser = StyleParser::with_config(UnitRegistry::default(), 8, EvictionPolicy::ClearAll);
        for value in &values {
            parser.parse_style(value, ParseMode::Default);
        }
        prop_assert!(parser.cache_stats().size <= 8);
    }
}

#[test]
fn custom_unit_expansion_contains_gap() {
    let parser = StyleParser::new();
    let parsed = parser.parse_style("2x", ParseMode::RemInsertion);
    assert!(parsed.value.contains("var(--gap)"));
    assert!(parsed.value.starts_with("calc("));
}

#[test]
fn border_shorthand() {
    let parser = StyleParser::new();
    let parsed = parser.parse_style("1x solid #dark", ParseMode::Default);
    assert!(parsed.value.contains("var(--gap)"));
    assert!(parsed.value.contains("var(--dark-color)"));
    assert!(!parsed.mods.iter().any(|m| m == "solid"));
}

#[test]
fn color_flat_and_translucent() {
    let parser = StyleParser::new();
    assert_eq!(
        parser.parse_color("#purple", false).color.as_deref(),
        Some("var(--purple-color)")
    );
    assert_eq!(
        parser.parse_color("#purple.50", false).color.as_deref(),
        Some("rgba(var(--purple-color-rgb), 0.5)")
    );
}

#[test]
fn opacity_clamping_edges() {
    let parser = StyleParser::new();
    assert_eq!(parser.parse_color("#dark.150", false).opacity, Some(100));
    assert_eq!(parser.parse_color("#dark.-10", false).opacity, Some(0));
}
