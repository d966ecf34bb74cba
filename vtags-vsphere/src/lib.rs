//! vtags vSphere client
//!
//! Session lifecycle and inventory/tagging queries against a vCenter-style
//! Automation REST API. The session traits are the seam the cache consumes;
//! mock implementations live in [`mock`] for tests.

pub mod endpoint;
pub mod mock;
pub mod rest;
pub mod session;

pub use endpoint::{Endpoint, DEFAULT_TIMEOUT};
pub use rest::{RestManagementSession, RestSessionFactory, RestTaggingSession};
pub use session::{ManagementSession, SessionFactory, TaggingSession};
