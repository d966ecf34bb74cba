//! Session traits at the remote-API seam.
//!
//! Two logically-layered sessions: the management session authenticates
//! against the endpoint and serves inventory queries; the tagging session is
//! opened on top of a live management session and serves category and label
//! queries. Each exposes only what the cache consumes: a liveness probe, its
//! queries, and logout. A stale session is discarded and replaced, never
//! repaired in place.

use async_trait::async_trait;
use vtags_core::{AttachedLabelSet, Category, VtagsResult};

/// An authenticated management-layer session.
#[async_trait]
pub trait ManagementSession: Send + Sync {
    /// Best-effort liveness probe. Implementations must treat a
    /// permission-denied answer from the probe itself as "still active":
    /// narrowly-scoped credentials must not cause session churn.
    async fn is_active(&self) -> bool;

    /// List the monitored object inventory (virtual machines), returning
    /// opaque managed-object ids.
    async fn list_virtual_machines(&self) -> VtagsResult<Vec<String>>;

    /// Open a tagging session layered on this session's transport.
    async fn open_tagging(&self) -> VtagsResult<Box<dyn TaggingSession>>;

    /// Log out on the remote side.
    async fn logout(&self) -> VtagsResult<()>;
}

/// An authenticated tagging-layer session.
#[async_trait]
pub trait TaggingSession: Send + Sync {
    /// Best-effort liveness probe with the same permission-denied semantics
    /// as [`ManagementSession::is_active`].
    async fn is_active(&self) -> bool;

    /// Fetch all tag categories visible to this session.
    async fn list_categories(&self) -> VtagsResult<Vec<Category>>;

    /// Batch-fetch the labels attached to every given object in a single
    /// remote call. Never issued per-object.
    async fn attached_labels(&self, object_ids: &[String]) -> VtagsResult<Vec<AttachedLabelSet>>;

    /// Log out on the remote side.
    async fn logout(&self) -> VtagsResult<()>;
}

/// Opens management sessions against one endpoint.
///
/// Sessions are expensive to establish (full authentication handshake), so
/// the factory is only invoked when no live session exists.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open_management(&self) -> VtagsResult<Box<dyn ManagementSession>>;
}
