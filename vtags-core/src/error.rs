//! Error types for vtags operations

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The two remote session layers.
///
/// The tagging session is layered on top of the management session and is
/// only ever opened against a live management session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Management,
    Tagging,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKind::Management => write!(f, "management"),
            SessionKind::Tagging => write!(f, "tagging"),
        }
    }
}

/// Configuration errors. Fatal at startup, surfaced to the caller, never
/// retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: &'static str },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to load TLS trust material from {path}: {reason}")]
    TlsTrust { path: PathBuf, reason: String },

    #[error("Failed to build HTTP client: {reason}")]
    HttpClient { reason: String },
}

/// Session errors. The current refresh cycle is aborted and retried on the
/// next scheduled tick.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{kind} session login failed: {reason}")]
    LoginFailed { kind: SessionKind, reason: String },

    #[error("{kind} session is not established")]
    NotEstablished { kind: SessionKind },
}

/// Query errors raised mid-cycle by inventory/category/label fetches. The
/// cycle is aborted, the previous mapping is retained, and the fetch is
/// retried on the next tick.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("{operation} request failed with status {status}: {reason}")]
    RequestFailed {
        operation: &'static str,
        status: u16,
        reason: String,
    },

    #[error("{operation} transport error: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} returned an invalid response: {reason}")]
    InvalidResponse {
        operation: &'static str,
        reason: String,
    },

    #[error("refresh cycle exceeded its {budget:?} budget")]
    DeadlineExceeded { budget: Duration },
}

/// Master error type for all vtags errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VtagsError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}

/// Result alias used throughout the vtags crates.
pub type VtagsResult<T> = Result<T, VtagsError>;
