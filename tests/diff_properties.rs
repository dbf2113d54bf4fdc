//! Property tests for the diff engine
//!
//! Generates arbitrary pairs of archives and checks the algebra the
//! engine guarantees: empty diff on identical inputs, added/removed
//! symmetry under argument swap, partition completeness, and aggregate
//! deltas that agree with per-entry arithmetic.

use std::collections::BTreeMap;

use proptest::prelude::*;

use pakdiff::diff::{jar_diff, DiffResult};
use pakdiff::mapping::ApiMapping;
use pakdiff::model::Jar;

mod common;
use common::fixtures;

fn jar_from(entries: &BTreeMap<String, Vec<u8>>) -> Jar {
    let pairs: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(path, content)| (path.as_str(), content.as_slice()))
        .collect();
    let bytes = fixtures::zip_bytes(&pairs);
    Jar::parse(&bytes, &ApiMapping::empty()).expect("generated jar parses")
}

fn old_count(result: &DiffResult) -> usize {
    result.entries.removed.len() + result.entries.changed.len() + result.entries.unchanged_count
}

fn new_count(result: &DiffResult) -> usize {
    result.entries.added.len() + result.entries.changed.len() + result.entries.unchanged_count
}

prop_compose! {
    fn entry_set()(
        entries in prop::collection::btree_map(
            "[a-z]{1,8}\\.txt",
            prop::collection::vec(any::<u8>(), 0..64),
            0..8,
        )
    ) -> BTreeMap<String, Vec<u8>> {
        entries
    }
}

proptest! {
    #[test]
    fn identical_inputs_diff_empty(entries in entry_set()) {
        let old = jar_from(&entries);
        let new = jar_from(&entries);
        let result = jar_diff(&old, &new).expect("diff");
        prop_assert!(result.is_empty());
        prop_assert_eq!(result.install.delta(), 0);
        prop_assert_eq!(result.download.delta(), 0);
        prop_assert_eq!(result.entries.unchanged_count, entries.len());
    }

    #[test]
    fn swap_negates_the_diff(old in entry_set(), new in entry_set()) {
        let old_jar = jar_from(&old);
        let new_jar = jar_from(&new);
        let forward = jar_diff(&old_jar, &new_jar).expect("diff");
        let backward = jar_diff(&new_jar, &old_jar).expect("diff");

        prop_assert_eq!(&forward.entries.added, &backward.entries.removed);
        prop_assert_eq!(&forward.entries.removed, &backward.entries.added);
        prop_assert_eq!(forward.entries.changed.len(), backward.entries.changed.len());
        prop_assert_eq!(forward.install.delta(), -backward.install.delta());
        prop_assert_eq!(forward.entries.net_delta(), -backward.entries.net_delta());
    }

    #[test]
    fn partition_is_complete(old in entry_set(), new in entry_set()) {
        let result = jar_diff(&jar_from(&old), &jar_from(&new)).expect("diff");
        // Every input entry lands in exactly one bucket
        prop_assert_eq!(old_count(&result), old.len());
        prop_assert_eq!(new_count(&result), new.len());
    }

    #[test]
    fn aggregate_delta_matches_entry_arithmetic(old in entry_set(), new in entry_set()) {
        let old_jar = jar_from(&old);
        let new_jar = jar_from(&new);
        let result = jar_diff(&old_jar, &new_jar).expect("diff");
        prop_assert_eq!(result.install.delta(), result.entries.net_delta());

        let old_total: u64 = old.values().map(|c| c.len() as u64).sum();
        let new_total: u64 = new.values().map(|c| c.len() as u64).sum();
        prop_assert_eq!(result.install.delta(), new_total as i64 - old_total as i64);
    }

    #[test]
    fn report_order_is_sorted(old in entry_set()) {
        let result = jar_diff(&jar_from(&old), &jar_from(&BTreeMap::new())).expect("diff");
        let paths: Vec<&String> = result.entries.removed.iter().map(|e| &e.path).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        prop_assert_eq!(paths, sorted);
    }
}
