//! Remote endpoint descriptor.
//!
//! An [`Endpoint`] is created once at startup from host configuration and is
//! immutable afterwards. It carries everything needed to open sessions:
//! base URL, credentials, TLS trust material and the total-request timeout
//! that bounds every remote call.

use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vtags_core::{ConfigError, VtagsResult};

/// Default total-request timeout applied to every remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Immutable descriptor of the remote vCenter endpoint.
#[derive(Clone)]
pub struct Endpoint {
    url: Url,
    username: String,
    password: String,
    tls_ca: Option<PathBuf>,
    insecure_skip_verify: bool,
    timeout: Duration,
}

impl Endpoint {
    /// Parse and validate the endpoint address and credentials.
    ///
    /// Missing credentials and unparseable URLs are configuration errors:
    /// fatal at startup, never retried.
    pub fn new(url: &str, username: &str, password: &str) -> VtagsResult<Self> {
        if username.trim().is_empty() {
            return Err(ConfigError::MissingRequired { field: "username" }.into());
        }
        if password.is_empty() {
            return Err(ConfigError::MissingRequired { field: "password" }.into());
        }
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", url.scheme()),
            }
            .into());
        }
        Ok(Self {
            url,
            username: username.to_string(),
            password: password.to_string(),
            tls_ca: None,
            insecure_skip_verify: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Trust an additional PEM-encoded CA certificate when verifying the
    /// remote side.
    pub fn with_tls_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.tls_ca = Some(path.into());
        self
    }

    /// Use TLS but skip chain and host verification.
    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    /// Override the total-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the HTTP client all sessions against this endpoint share.
    ///
    /// Reads the CA bundle from disk, so failures surface as configuration
    /// errors rather than session errors.
    pub(crate) fn build_http_client(&self) -> VtagsResult<Client> {
        let mut builder = Client::builder().use_rustls_tls().timeout(self.timeout);

        if let Some(path) = &self.tls_ca {
            let pem = read_trust_material(path)?;
            let cert =
                reqwest::Certificate::from_pem(&pem).map_err(|e| ConfigError::TlsTrust {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            builder = builder.add_root_certificate(cert);
        }
        if self.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| ConfigError::HttpClient { reason: e.to_string() }.into())
    }
}

fn read_trust_material(path: &Path) -> VtagsResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        ConfigError::TlsTrust {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("tls_ca", &self.tls_ca)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtags_core::VtagsError;

    #[test]
    fn test_valid_endpoint() {
        let ep = Endpoint::new("https://vcenter.local/sdk", "user@corp.local", "secret").unwrap();
        assert_eq!(ep.url().host_str(), Some("vcenter.local"));
        assert_eq!(ep.username(), "user@corp.local");
        assert_eq!(ep.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_missing_credentials_are_config_errors() {
        let err = Endpoint::new("https://vcenter.local", "", "secret").unwrap_err();
        assert!(matches!(
            err,
            VtagsError::Config(ConfigError::MissingRequired { field: "username" })
        ));

        let err = Endpoint::new("https://vcenter.local", "user", "").unwrap_err();
        assert!(matches!(
            err,
            VtagsError::Config(ConfigError::MissingRequired { field: "password" })
        ));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = Endpoint::new("not a url", "user", "secret").unwrap_err();
        assert!(matches!(err, VtagsError::Config(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = Endpoint::new("ftp://vcenter.local", "user", "secret").unwrap_err();
        assert!(matches!(err, VtagsError::Config(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_debug_redacts_password() {
        let ep = Endpoint::new("https://vcenter.local", "user", "hunter2").unwrap();
        let rendered = format!("{:?}", ep);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
