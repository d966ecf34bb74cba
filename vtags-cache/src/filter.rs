//! Category selection.

use vtags_core::Category;

/// Select the categories of interest given an optional allow-list.
///
/// An empty allow-list means no filtering: every category passes. Otherwise
/// only categories whose name appears in the allow-list are kept, matched
/// exactly and case-sensitively. Input order is preserved; the remote
/// category list has unique names, so no dedup is needed.
pub fn filter_categories(all: Vec<Category>, allowlist: &[String]) -> Vec<Category> {
    if allowlist.is_empty() {
        return all;
    }
    all.into_iter()
        .filter(|category| allowlist.iter().any(|name| name == &category.name))
        .collect()
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_categories() -> impl Strategy<Value = Vec<Category>> {
        prop::collection::vec("[A-Za-z]{1,12}", 0..16).prop_map(|names| {
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| Category::new(format!("c{i}"), name))
                .collect()
        })
    }

    proptest! {
        /// An empty allow-list is the identity transform.
        #[test]
        fn prop_empty_allowlist_is_identity(all in arb_categories()) {
            prop_assert_eq!(filter_categories(all.clone(), &[]), all);
        }

        /// Every kept category is named in the allow-list, and input order
        /// survives filtering.
        #[test]
        fn prop_filtered_is_ordered_subset(
            all in arb_categories(),
            allowlist in prop::collection::vec("[A-Za-z]{1,12}", 1..6),
        ) {
            let filtered = filter_categories(all.clone(), &allowlist);
            for category in &filtered {
                prop_assert!(allowlist.contains(&category.name));
            }

            // Order check: filtered must be a subsequence of the input.
            let mut cursor = all.iter();
            for category in &filtered {
                prop_assert!(cursor.any(|c| c == category));
            }
        }

        /// Filtering twice with the same allow-list is a fixpoint.
        #[test]
        fn prop_filter_is_idempotent(
            all in arb_categories(),
            allowlist in prop::collection::vec("[A-Za-z]{1,12}", 0..6),
        ) {
            let once = filter_categories(all, &allowlist);
            let twice = filter_categories(once.clone(), &allowlist);
            prop_assert_eq!(once, twice);
        }
    }
}
