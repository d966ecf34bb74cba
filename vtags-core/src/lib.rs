//! vtags Core - Data Types
//!
//! Pure data structures with no behavior. All other vtags crates depend on
//! this: tag/category shapes, the telemetry sample type, and the error
//! taxonomy.

pub mod error;
pub mod metric;
pub mod tags;

pub use error::{ConfigError, QueryError, SessionError, SessionKind, VtagsError, VtagsResult};
pub use metric::{FieldValue, Metric};
pub use tags::{AttachedLabel, AttachedLabelSet, Category, LabelMap, LabelSet};
