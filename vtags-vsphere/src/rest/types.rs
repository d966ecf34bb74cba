//! Wire shapes for the subset of the vCenter Automation API the cache
//! consumes. The protocol is taken as given; only the fields read here are
//! modeled.

use serde::{Deserialize, Serialize};
use vtags_core::{AttachedLabel, AttachedLabelSet, Category};

/// One entry of `GET /api/vcenter/vm`. Only the managed-object id is
/// consumed; the remaining summary fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VmSummary {
    /// Managed-object id, e.g. `vm-100`.
    pub vm: String,
}

/// One entry of `GET /api/cis/tagging/category`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryModel {
    pub category_id: String,
    pub name: String,
}

impl From<CategoryModel> for Category {
    fn from(model: CategoryModel) -> Self {
        Category::new(model.category_id, model.name)
    }
}

/// A typed managed-object reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ObjectRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Request body of the batch tag-association listing.
#[derive(Debug, Serialize)]
pub(crate) struct AttachedTagsRequest {
    pub object_ids: Vec<ObjectRef>,
}

/// One tag in a batch answer, already resolved to its category.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TagModel {
    pub name: String,
    pub category_id: String,
}

/// One object's slice of the batch answer.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ObjectTags {
    pub object_id: ObjectRef,
    pub tags: Vec<TagModel>,
}

impl From<ObjectTags> for AttachedLabelSet {
    fn from(entry: ObjectTags) -> Self {
        let labels = entry
            .tags
            .into_iter()
            .map(|tag| AttachedLabel::new(tag.category_id, tag.name))
            .collect();
        AttachedLabelSet::new(entry.object_id.id, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_summary_decodes_without_optional_fields() {
        let summary: VmSummary = serde_json::from_str(r#"{"vm":"vm-100"}"#).unwrap();
        assert_eq!(summary.vm, "vm-100");
    }

    #[test]
    fn test_object_tags_to_attached_label_set() {
        let raw = r#"{
            "object_id": {"id": "vm-100", "type": "VirtualMachine"},
            "tags": [{"tag_id": "t1", "name": "prod", "category_id": "c1"}]
        }"#;
        let entry: ObjectTags = serde_json::from_str(raw).unwrap();
        let set: AttachedLabelSet = entry.into();
        assert_eq!(set.object_id, "vm-100");
        assert_eq!(set.labels, vec![AttachedLabel::new("c1", "prod")]);
    }

    #[test]
    fn test_category_model_to_category() {
        let raw = r#"{"category_id": "c1", "name": "Env"}"#;
        let model: CategoryModel = serde_json::from_str(raw).unwrap();
        let category: Category = model.into();
        assert_eq!(category, Category::new("c1", "Env"));
    }
}
