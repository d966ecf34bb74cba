//! Property-Based Tests for the Tag Cache
//!
//! Property: concurrent lookups during an in-flight refresh observe either
//! the previous complete snapshot or the new complete snapshot, never an
//! interleaving.
//!
//! Plus structural invariants of the rebuilt mapping: no empty label sets,
//! no categories outside the filtered list.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vtags_cache::{build_label_map, filter_categories, TagCache};
use vtags_core::{AttachedLabel, AttachedLabelSet, Category};
use vtags_vsphere::mock::MockSessionFactory;

// ============================================================================
// CONCURRENT SWAP PROPERTY
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_never_observe_partial_swap() {
    const OBJECTS: usize = 50;
    const SWAPS: usize = 200;
    const READERS: usize = 4;

    let ids: Vec<String> = (0..OBJECTS).map(|i| format!("vm-{i}")).collect();
    let generation = |value: &str| -> Vec<AttachedLabelSet> {
        ids.iter()
            .map(|id| AttachedLabelSet::new(id.clone(), vec![AttachedLabel::new("c1", value)]))
            .collect()
    };

    let factory = MockSessionFactory::new();
    factory.set_categories(vec![Category::new("c1", "Env")]);
    factory.set_virtual_machines(ids.iter().map(String::as_str).collect());
    factory.set_attached_labels(generation("blue"));

    let cache = Arc::new(TagCache::new(
        Arc::new(factory.clone()),
        Duration::from_secs(5),
    ));
    cache.refresh_now().await.unwrap();

    // Readers hammer the lookup path from plain OS threads while the main
    // task keeps swapping full generations in.
    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let stop = Arc::clone(&stop);
            let ids = ids.clone();
            std::thread::spawn(move || {
                let mut reads = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    for id in &ids {
                        match cache.get(id) {
                            Some(labels) => {
                                let value = labels.get("Env").expect("Env label present");
                                assert!(
                                    value == "blue" || value == "green",
                                    "unexpected label value {value}"
                                );
                            }
                            None => panic!("lookup observed a partially swapped mapping"),
                        }
                        reads += 1;
                    }
                }
                reads
            })
        })
        .collect();

    for swap in 0..SWAPS {
        let value = if swap % 2 == 0 { "green" } else { "blue" };
        factory.set_attached_labels(generation(value));
        cache.refresh_now().await.unwrap();
    }

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        let reads = reader.join().expect("reader thread panicked");
        assert!(reads > 0, "reader performed no lookups");
    }
}

// ============================================================================
// MAPPING STRUCTURE PROPERTIES
// ============================================================================

/// Categories with unique ids and names, plus batch answers that may
/// reference category ids outside the known list.
fn arb_world() -> impl Strategy<Value = (Vec<Category>, Vec<AttachedLabelSet>)> {
    let categories = prop::collection::vec("[A-Z][a-z]{0,8}", 1..8).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Category::new(format!("c{i}"), format!("{name}{i}")))
            .collect::<Vec<_>>()
    });

    categories.prop_flat_map(|categories| {
        let id_range = categories.len() * 2;
        let attached = prop::collection::vec(
            prop::collection::vec((0..id_range, "[a-z]{1,8}"), 0..5),
            0..10,
        )
        .prop_map(move |objects| {
            objects
                .into_iter()
                .enumerate()
                .map(|(i, labels)| {
                    AttachedLabelSet::new(
                        format!("vm-{i}"),
                        labels
                            .into_iter()
                            .map(|(ci, name)| AttachedLabel::new(format!("c{ci}"), name))
                            .collect(),
                    )
                })
                .collect::<Vec<_>>()
        });
        (Just(categories), attached)
    })
}

proptest! {
    /// Objects without any resolvable label are omitted entirely, never
    /// stored with an empty set.
    #[test]
    fn prop_no_empty_label_sets((categories, attached) in arb_world()) {
        let map = build_label_map(&categories, attached);
        for labels in map.values() {
            prop_assert!(!labels.is_empty());
        }
    }

    /// Every stored label is keyed by a known category name; labels in
    /// unknown categories are dropped silently.
    #[test]
    fn prop_only_known_category_names((categories, attached) in arb_world()) {
        let known: HashSet<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        let map = build_label_map(&categories, attached);
        for labels in map.values() {
            for name in labels.keys() {
                prop_assert!(known.contains(name.as_str()));
            }
        }
    }

    /// With an allow-list applied, no excluded category ever reaches the
    /// mapping.
    #[test]
    fn prop_allowlist_excludes_other_categories(
        (categories, attached) in arb_world(),
        pick in any::<prop::sample::Index>(),
    ) {
        let allowlist = vec![categories[pick.index(categories.len())].name.clone()];
        let filtered = filter_categories(categories, &allowlist);
        let map = build_label_map(&filtered, attached);
        for labels in map.values() {
            for name in labels.keys() {
                prop_assert!(allowlist.contains(name));
            }
        }
    }
}
