//! Property tests for code unit extraction.

use proptest::prelude::*;

use hot_reload::parse_file;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Extraction never panics on arbitrary input.
    #[test]
    fn property_parse_never_panics(
        s in "(?s).{0,256}"
    ) {
        let _ = parse_file(&s);
    }

    /// PROPERTY: Every free function becomes exactly one unit.
    #[test]
    fn property_one_unit_per_function(
        names in proptest::collection::btree_set("g_[a-z]{1,8}", 0..10)
    ) {
        let source: String = names.iter().map(|n| format!("fn {n}() {{}}\n")).collect();
        let parsed = parse_file(&source).unwrap();
        let found: Vec<String> = parsed.units.iter().map(|u| u.name.clone()).collect();
        prop_assert_eq!(found, names.into_iter().collect::<Vec<_>>());
    }
}
