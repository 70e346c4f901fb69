//! Property-based tests for the invariants both encoders promise on every
//! input: one line per value, bare strings only when they read back as one
//! token, and reflective output that any JSON parser accepts.

use proptest::prelude::*;
use serde_logtext::text::needs_quoting;
use serde_logtext::{
    to_string, EncoderConfig, Field, ObjectEncoder, PrimitiveArrayEncoder, TextEncoder,
};
use std::collections::BTreeMap;

fn bare() -> TextEncoder {
    TextEncoder::new(EncoderConfig::bare())
}

fn encode_string(s: &str) -> String {
    let mut enc = bare();
    enc.add_string("k", s);
    enc.buffer().to_string_lossy()
}

proptest! {
    #[test]
    fn prop_string_stays_on_one_line(s in any::<String>()) {
        let out = encode_string(&s);
        prop_assert!(!out.contains('\n'));
        prop_assert!(!out.contains('\r'));
        prop_assert!(out.starts_with("k="));
    }

    #[test]
    fn prop_bare_strings_are_single_tokens(s in any::<String>()) {
        let out = encode_string(&s);
        let rendered = &out["k=".len()..];
        if needs_quoting(s.as_bytes()) {
            prop_assert!(rendered.len() >= 2);
            prop_assert!(rendered.starts_with('"') && rendered.ends_with('"'));
        } else {
            prop_assert_eq!(rendered, s.as_str());
            prop_assert!(!rendered.is_empty());
            prop_assert!(!rendered.contains(char::is_whitespace));
            prop_assert!(!rendered.contains('"') && !rendered.contains('='));
        }
    }

    #[test]
    fn prop_identifier_like_strings_unquoted(s in "[a-zA-Z0-9_./-]{1,24}") {
        prop_assert_eq!(encode_string(&s), format!("k={}", s));
    }

    #[test]
    fn prop_top_level_fields_single_spaced(values in prop::collection::vec(any::<i64>(), 1..10)) {
        let mut enc = bare();
        for (i, v) in values.iter().enumerate() {
            enc.add_int64(&format!("f{}", i), *v);
        }
        let out = enc.buffer().to_string_lossy();
        prop_assert_eq!(out.split(' ').count(), values.len());
        prop_assert!(!out.contains("  "));
    }

    #[test]
    fn prop_array_shape(values in prop::collection::vec(any::<i64>(), 0..20)) {
        let mut enc = bare();
        Field::array_of("a", values.clone()).add_to(&mut enc).unwrap();
        let out = enc.buffer().to_string_lossy();
        let inner = out
            .strip_prefix("a=[")
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap();
        let expected: Vec<String> = values.iter().map(i64::to_string).collect();
        prop_assert_eq!(inner, expected.join(","));
    }

    #[test]
    fn prop_finite_floats_match_display(v in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let mut enc = bare();
        enc.add_float64("f", v);
        prop_assert_eq!(enc.buffer().to_string_lossy(), format!("f={}", v));
    }

    #[test]
    fn prop_float32_elements_keep_native_width(v in any::<f32>().prop_filter("finite", |v| v.is_finite())) {
        let mut enc = bare();
        enc.append_float32(v);
        prop_assert_eq!(enc.buffer().to_string_lossy(), v.to_string());
    }

    #[test]
    fn prop_reflected_maps_sorted_and_parseable(
        map in prop::collection::hash_map(any::<String>(), any::<i64>(), 0..12)
    ) {
        let out = to_string(&map).unwrap();
        let parsed: BTreeMap<String, i64> = serde_json::from_str(&out).unwrap();
        let expected: BTreeMap<String, i64> = map.clone().into_iter().collect();
        prop_assert_eq!(&parsed, &expected);

        prop_assert_eq!(out, to_string(&expected).unwrap());
    }

    #[test]
    fn prop_reflected_strings_parse_back(s in any::<String>()) {
        let out = to_string(&s).unwrap();
        let parsed: String = serde_json::from_str(&out).unwrap();
        prop_assert_eq!(parsed, s);
    }

    #[test]
    fn prop_reflected_nesting_within_limit(depth in 1usize..=32) {
        let mut value = serde_json::json!(0);
        for _ in 0..depth {
            value = serde_json::json!([value]);
        }
        prop_assert!(to_string(&value).is_ok());
    }
}

#[test]
fn test_nesting_past_limit_always_fails() {
    for depth in 33..40 {
        let mut value = serde_json::json!(0);
        for _ in 0..depth {
            value = serde_json::json!([value]);
        }
        assert!(to_string(&value).unwrap_err().is_depth_exceeded());
    }
}
