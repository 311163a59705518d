//! Property tests for the structural differ.

use proptest::prelude::*;

use hot_reload::{parse_file, StructuralDiffer};

fn ident() -> impl Strategy<Value = String> {
    proptest::string::string_regex("f_[a-z]{1,8}").unwrap()
}

/// A file of distinct free functions returning small constants
fn source_file() -> impl Strategy<Value = (Vec<String>, Vec<u32>)> {
    proptest::collection::btree_set(ident(), 1..8).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let len = names.len();
        (Just(names), proptest::collection::vec(0u32..1000, len))
    })
}

fn render(names: &[String], values: &[u32], spacing: &str) -> String {
    names
        .iter()
        .zip(values)
        .map(|(name, value)| format!("pub fn {name}(){spacing}->{spacing}u32 {{{spacing}{value}{spacing}}}\n"))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Diffing a file against itself reports nothing.
    #[test]
    fn property_identical_files_have_empty_diff(
        (names, values) in source_file()
    ) {
        let parsed = parse_file(&render(&names, &values, " ")).unwrap();
        let diff = StructuralDiffer::new().diff(&parsed.units, &parsed.units);
        prop_assert!(diff.is_empty());
    }

    /// PROPERTY: Whitespace never changes the diff outcome.
    #[test]
    fn property_whitespace_is_not_a_change(
        (names, values) in source_file(),
        spacing in "[ \t\n]{1,4}"
    ) {
        let old = parse_file(&render(&names, &values, " ")).unwrap();
        let new = parse_file(&render(&names, &values, &spacing)).unwrap();
        let diff = StructuralDiffer::new().diff(&old.units, &new.units);
        prop_assert!(diff.is_empty());
    }

    /// PROPERTY: A body-only edit of one function is exactly one change.
    #[test]
    fn property_body_edit_is_single_change(
        (names, values) in source_file(),
        pick in any::<proptest::sample::Index>()
    ) {
        let target = pick.index(names.len());
        let mut edited = values.clone();
        edited[target] += 1000;

        let old = parse_file(&render(&names, &values, " ")).unwrap();
        let new = parse_file(&render(&names, &edited, " ")).unwrap();
        let diff = StructuralDiffer::new().diff(&old.units, &new.units);

        prop_assert_eq!(diff.len(), 1);
        let changed: Vec<_> = diff.changed().map(|(_, new)| new.name.clone()).collect();
        prop_assert_eq!(changed, vec![names[target].clone()]);
    }
}
