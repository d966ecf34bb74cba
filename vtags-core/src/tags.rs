//! Tag and category shapes exchanged with the remote endpoint.
//!
//! Identifiers are opaque strings. Only the `(id, name)` and
//! `(category_id, name)` shapes consumed by the cache are modeled; the remote
//! object model is not mirrored here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Labels attached to one object, keyed by category name.
pub type LabelSet = HashMap<String, String>;

/// The cache's externally visible state: object id -> category name -> label
/// name. An object id is present only if it carries at least one label in a
/// filtered category.
pub type LabelMap = HashMap<String, LabelSet>;

/// A tag category as reported by the remote endpoint.
///
/// Snapshot data: fetched on every refresh cycle, never cached across cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Opaque category identifier.
    pub id: String,
    /// Human-assigned category name; unique on the remote side.
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One label attached to an object, before category-name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedLabel {
    /// Opaque identifier of the category the label belongs to.
    pub category_id: String,
    /// The label value itself.
    pub name: String,
}

impl AttachedLabel {
    pub fn new(category_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            name: name.into(),
        }
    }
}

/// The raw remote answer for one object: every label attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedLabelSet {
    /// Opaque managed-object identifier.
    pub object_id: String,
    /// Labels attached to the object, unresolved.
    pub labels: Vec<AttachedLabel>,
}

impl AttachedLabelSet {
    pub fn new(object_id: impl Into<String>, labels: Vec<AttachedLabel>) -> Self {
        Self {
            object_id: object_id.into(),
            labels,
        }
    }
}
