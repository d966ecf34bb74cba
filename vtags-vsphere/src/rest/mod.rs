//! REST implementations of the session traits against the vCenter
//! Automation API.
//!
//! Two session layers map onto two token-carrying clients: the management
//! session logs in at `/api/session` with basic credentials; the tagging
//! session logs in at `/api/cis/session` authorized by the management
//! token. All subsequent calls carry the session token in the
//! `vmware-api-session-id` header.

pub mod management;
pub mod tagging;
pub(crate) mod types;

pub use management::{RestManagementSession, RestSessionFactory};
pub use tagging::RestTaggingSession;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use vtags_core::{QueryError, VtagsError, VtagsResult};

/// Header carrying the session token on authenticated calls.
pub(crate) const SESSION_HEADER: &str = "vmware-api-session-id";

/// Managed-object type of the monitored inventory.
pub(crate) const VM_TYPE: &str = "VirtualMachine";

pub(crate) fn transport_error(operation: &'static str, err: reqwest::Error) -> VtagsError {
    QueryError::Transport {
        operation,
        reason: err.to_string(),
    }
    .into()
}

/// Turn a non-success response into a query error carrying the operation
/// name and whatever body the remote side returned.
pub(crate) async fn response_error(operation: &'static str, response: Response) -> VtagsError {
    let status = response.status();
    let reason = response
        .text()
        .await
        .unwrap_or_else(|_| "no response body".to_string());
    QueryError::RequestFailed {
        operation,
        status: status.as_u16(),
        reason,
    }
    .into()
}

/// Decode a success response body, wrapping decode failures with the
/// operation name.
pub(crate) async fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> VtagsResult<T> {
    response.json().await.map_err(|e| {
        QueryError::InvalidResponse {
            operation,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Shared probe semantics for both session layers: any success answer means
/// the session is honored, permission-denied means the probe call (not the
/// session) lacks privileges, everything else means stale.
pub(crate) fn probe_status_is_active(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::FORBIDDEN
}
