//! vtags Cache
//!
//! The label cache with background refresh and session lifecycle
//! management: a periodically-rebuilt, point-in-time-consistent mapping from
//! managed-object id to label-set, served to a concurrent enrichment path.
//!
//! The refresh loop is the single owner of the remote sessions; lookups only
//! ever touch the lock-guarded mapping. Each refresh is a full replace — the
//! previous snapshot stays visible until a complete new one swaps in.

pub mod cache;
pub mod filter;
pub mod refresh;
pub mod sessions;

pub use cache::{RefreshMetrics, RefreshSnapshot, TagCache};
pub use filter::filter_categories;
pub use refresh::build_label_map;
pub use sessions::SessionManager;
