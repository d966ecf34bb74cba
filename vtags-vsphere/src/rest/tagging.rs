//! Tagging-layer REST session.

use super::types::{AttachedTagsRequest, CategoryModel, ObjectRef, ObjectTags};
use super::{probe_status_is_active, read_json, response_error, transport_error, SESSION_HEADER, VM_TYPE};
use crate::session::TaggingSession;
use async_trait::async_trait;
use reqwest::Client;
use vtags_core::{AttachedLabelSet, Category, VtagsResult};

/// An authenticated `/api/cis/session` handle, layered on a management
/// session's transport.
pub struct RestTaggingSession {
    http: Client,
    base: String,
    token: String,
}

impl RestTaggingSession {
    pub(crate) fn new(http: Client, base: String, token: String) -> Self {
        Self { http, base, token }
    }
}

#[async_trait]
impl TaggingSession for RestTaggingSession {
    async fn is_active(&self) -> bool {
        let request = self
            .http
            .get(format!("{}/api/cis/session", self.base))
            .header(SESSION_HEADER, &self.token);
        match request.send().await {
            Ok(response) => probe_status_is_active(response.status()),
            Err(_) => false,
        }
    }

    async fn list_categories(&self) -> VtagsResult<Vec<Category>> {
        const OPERATION: &str = "list tag categories";
        let response = self
            .http
            .get(format!("{}/api/cis/tagging/category", self.base))
            .header(SESSION_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;

        if !response.status().is_success() {
            return Err(response_error(OPERATION, response).await);
        }
        let categories: Vec<CategoryModel> = read_json(OPERATION, response).await?;
        Ok(categories.into_iter().map(Category::from).collect())
    }

    async fn attached_labels(&self, object_ids: &[String]) -> VtagsResult<Vec<AttachedLabelSet>> {
        const OPERATION: &str = "list attached tags";
        let body = AttachedTagsRequest {
            object_ids: object_ids
                .iter()
                .map(|id| ObjectRef {
                    id: id.clone(),
                    kind: VM_TYPE.to_string(),
                })
                .collect(),
        };
        let response = self
            .http
            .post(format!(
                "{}/api/cis/tagging/tag-association?action=list-attached-tags-on-objects",
                self.base
            ))
            .header(SESSION_HEADER, &self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;

        if !response.status().is_success() {
            return Err(response_error(OPERATION, response).await);
        }
        let entries: Vec<ObjectTags> = read_json(OPERATION, response).await?;
        Ok(entries.into_iter().map(AttachedLabelSet::from).collect())
    }

    async fn logout(&self) -> VtagsResult<()> {
        const OPERATION: &str = "tagging logout";
        let response = self
            .http
            .delete(format!("{}/api/cis/session", self.base))
            .header(SESSION_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;
        if !response.status().is_success() {
            return Err(response_error(OPERATION, response).await);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RestTaggingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTaggingSession")
            .field("base", &self.base)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
