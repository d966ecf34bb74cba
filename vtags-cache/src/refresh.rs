//! One full refresh cycle: renew sessions, fetch, rebuild.
//!
//! The cycle produces a complete replacement [`LabelMap`]; the caller swaps
//! it into the cache. A failure anywhere aborts the cycle and leaves the
//! previously visible mapping untouched.

use crate::filter::filter_categories;
use crate::sessions::SessionManager;
use vtags_core::{AttachedLabelSet, Category, LabelMap, LabelSet, VtagsResult};

/// Run the fetch half of a refresh cycle and build the replacement mapping.
///
/// Failure handling is deliberately asymmetric: a categories fetch failure
/// drops the tagging session (it usually signals remote-side expiry), while
/// inventory and label fetch failures leave both handles alone and are
/// reported as plain query failures.
pub(crate) async fn refresh_label_map(
    sessions: &mut SessionManager,
    allowlist: &[String],
) -> VtagsResult<LabelMap> {
    sessions.ensure_sessions().await?;

    let fetched = sessions.tagging()?.list_categories().await;
    let categories = match fetched {
        Ok(categories) => categories,
        Err(err) => {
            sessions.reset_tagging();
            return Err(err);
        }
    };
    let categories = filter_categories(categories, allowlist);

    let virtual_machines = sessions.management()?.list_virtual_machines().await?;
    if virtual_machines.is_empty() {
        return Ok(LabelMap::new());
    }

    let attached = sessions.tagging()?.attached_labels(&virtual_machines).await?;
    Ok(build_label_map(&categories, attached))
}

/// Resolve batch answers against the filtered category list.
///
/// A label whose category is not in the filtered list is dropped silently;
/// objects left without any resolved label are omitted entirely.
pub fn build_label_map(categories: &[Category], attached: Vec<AttachedLabelSet>) -> LabelMap {
    let mut map = LabelMap::new();
    for set in attached {
        let mut labels = LabelSet::new();
        for label in set.labels {
            if let Some(category) = categories.iter().find(|c| c.id == label.category_id) {
                labels.insert(category.name.clone(), label.name);
            }
        }
        if !labels.is_empty() {
            map.insert(set.object_id, labels);
        }
    }
    map
}
