//! Management-layer REST session and the factory that opens it.

use super::tagging::RestTaggingSession;
use super::types::VmSummary;
use super::{probe_status_is_active, read_json, response_error, transport_error, SESSION_HEADER};
use crate::endpoint::Endpoint;
use crate::session::{ManagementSession, SessionFactory, TaggingSession};
use async_trait::async_trait;
use reqwest::Client;
use vtags_core::{SessionError, SessionKind, VtagsResult};

/// Opens management sessions against one endpoint. Holds the shared HTTP
/// client so TLS trust material is loaded exactly once, at startup.
pub struct RestSessionFactory {
    endpoint: Endpoint,
    http: Client,
}

impl RestSessionFactory {
    /// Build the factory and its HTTP client. TLS and client-construction
    /// failures surface here as configuration errors.
    pub fn new(endpoint: Endpoint) -> VtagsResult<Self> {
        let http = endpoint.build_http_client()?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[async_trait]
impl SessionFactory for RestSessionFactory {
    async fn open_management(&self) -> VtagsResult<Box<dyn ManagementSession>> {
        let base = api_base(&self.endpoint);
        let response = self
            .http
            .post(format!("{base}/api/session"))
            .basic_auth(self.endpoint.username(), Some(self.endpoint.password()))
            .send()
            .await
            .map_err(|e| SessionError::LoginFailed {
                kind: SessionKind::Management,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            return Err(SessionError::LoginFailed {
                kind: SessionKind::Management,
                reason: format!("status {status}: {body}"),
            }
            .into());
        }

        let token: String = response.json().await.map_err(|e| SessionError::LoginFailed {
            kind: SessionKind::Management,
            reason: format!("unreadable session token: {e}"),
        })?;

        tracing::debug!(endpoint = %self.endpoint.url(), "management session established");
        Ok(Box::new(RestManagementSession {
            http: self.http.clone(),
            base,
            token,
        }))
    }
}

impl std::fmt::Debug for RestSessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestSessionFactory")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// An authenticated `/api/session` handle.
pub struct RestManagementSession {
    http: Client,
    base: String,
    token: String,
}

#[async_trait]
impl ManagementSession for RestManagementSession {
    async fn is_active(&self) -> bool {
        let request = self
            .http
            .get(format!("{}/api/session", self.base))
            .header(SESSION_HEADER, &self.token);
        match request.send().await {
            Ok(response) => probe_status_is_active(response.status()),
            Err(_) => false,
        }
    }

    async fn list_virtual_machines(&self) -> VtagsResult<Vec<String>> {
        const OPERATION: &str = "list virtual machines";
        let response = self
            .http
            .get(format!("{}/api/vcenter/vm", self.base))
            .header(SESSION_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;

        if !response.status().is_success() {
            return Err(response_error(OPERATION, response).await);
        }
        let vms: Vec<VmSummary> = read_json(OPERATION, response).await?;
        Ok(vms.into_iter().map(|summary| summary.vm).collect())
    }

    async fn open_tagging(&self) -> VtagsResult<Box<dyn TaggingSession>> {
        let response = self
            .http
            .post(format!("{}/api/cis/session", self.base))
            .header(SESSION_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| SessionError::LoginFailed {
                kind: SessionKind::Tagging,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            return Err(SessionError::LoginFailed {
                kind: SessionKind::Tagging,
                reason: format!("status {status}: {body}"),
            }
            .into());
        }

        let token: String = response.json().await.map_err(|e| SessionError::LoginFailed {
            kind: SessionKind::Tagging,
            reason: format!("unreadable session token: {e}"),
        })?;

        tracing::debug!("tagging session established");
        Ok(Box::new(RestTaggingSession::new(
            self.http.clone(),
            self.base.clone(),
            token,
        )))
    }

    async fn logout(&self) -> VtagsResult<()> {
        const OPERATION: &str = "management logout";
        let response = self
            .http
            .delete(format!("{}/api/session", self.base))
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

impl std::fmt::Debug for RestManagementSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestManagementSession")
            .field("base", &self.base)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// The API root: the endpoint URL without a trailing slash.
fn api_base(endpoint: &Endpoint) -> String {
    endpoint.url().as_str().trim_end_matches('/').to_string()
}
