//! Processor configuration.
//!
//! Loaded from TOML by the host, overridable via `VTAGS_*` environment
//! variables. Validation failures are fatal at startup and never retried.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use vtags_core::{ConfigError, VtagsResult};
use vtags_vsphere::Endpoint;

pub const DEFAULT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_CACHE_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_MOID_TAG: &str = "moid";

/// Sample TOML configuration, in the shape hosts embed in their docs.
pub const SAMPLE_CONFIG: &str = r#"
## vCenter endpoint to read tags from, and its credentials
vcenter = "https://vcenter.local"
username = "user@corp.local"
password = "secret"
## Total timeout for one refresh cycle, in seconds
# timeout_secs = 180
## Optional PEM-encoded CA certificate path
# tls_ca = ""
## Use TLS but skip chain and host verification
# insecure_skip_verify = false

## Tag categories to enrich samples with (empty = all)
# vsphere_categories = []
## Sample tag carrying the vSphere managed-object id
# metric_moid_tag = "moid"
## Tag cache refresh interval, in seconds
# cache_interval_secs = 600
"#;

/// Host-supplied configuration for the tag processor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    /// vCenter endpoint URL.
    pub vcenter: String,

    /// Login username.
    pub username: String,

    /// Login password.
    pub password: String,

    /// Total budget for one refresh cycle, session renewal included.
    pub timeout_secs: u64,

    /// Optional PEM-encoded CA certificate to trust.
    pub tls_ca: Option<PathBuf>,

    /// Use TLS but skip chain and host verification.
    pub insecure_skip_verify: bool,

    /// Category allow-list; empty means every category.
    pub vsphere_categories: Vec<String>,

    /// Sample tag carrying the managed-object id.
    pub metric_moid_tag: String,

    /// Refresh interval for the tag cache.
    pub cache_interval_secs: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            vcenter: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tls_ca: None,
            insecure_skip_verify: false,
            vsphere_categories: Vec::new(),
            metric_moid_tag: DEFAULT_MOID_TAG.to_string(),
            cache_interval_secs: DEFAULT_CACHE_INTERVAL_SECS,
        }
    }
}

impl ProcessorConfig {
    /// Parse a TOML document.
    pub fn from_toml(contents: &str) -> VtagsResult<Self> {
        toml::from_str(contents).map_err(|e| {
            ConfigError::InvalidValue {
                field: "config",
                value: String::new(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Overlay `VTAGS_*` environment variables on the defaults.
    ///
    /// # Environment Variables
    /// - `VTAGS_VCENTER`: endpoint URL
    /// - `VTAGS_USERNAME` / `VTAGS_PASSWORD`: credentials
    /// - `VTAGS_TIMEOUT_SECS`: refresh cycle budget (default: 180)
    /// - `VTAGS_TLS_CA`: PEM CA certificate path
    /// - `VTAGS_INSECURE_SKIP_VERIFY`: "true" or "false" (default: false)
    /// - `VTAGS_CATEGORIES`: comma-separated category allow-list
    /// - `VTAGS_MOID_TAG`: sample tag carrying the object id (default: moid)
    /// - `VTAGS_CACHE_INTERVAL_SECS`: refresh interval (default: 600)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("VTAGS_VCENTER") {
            config.vcenter = value;
        }
        if let Ok(value) = std::env::var("VTAGS_USERNAME") {
            config.username = value;
        }
        if let Ok(value) = std::env::var("VTAGS_PASSWORD") {
            config.password = value;
        }
        config.timeout_secs = std::env::var("VTAGS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if let Ok(value) = std::env::var("VTAGS_TLS_CA") {
            if !value.is_empty() {
                config.tls_ca = Some(PathBuf::from(value));
            }
        }
        config.insecure_skip_verify = std::env::var("VTAGS_INSECURE_SKIP_VERIFY")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);
        if let Ok(value) = std::env::var("VTAGS_CATEGORIES") {
            config.vsphere_categories = value
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
        }
        if let Ok(value) = std::env::var("VTAGS_MOID_TAG") {
            config.metric_moid_tag = value;
        }
        config.cache_interval_secs = std::env::var("VTAGS_CACHE_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_INTERVAL_SECS);

        config
    }

    /// Reject configurations the processor cannot start with.
    pub fn validate(&self) -> VtagsResult<()> {
        if self.vcenter.trim().is_empty() {
            return Err(ConfigError::MissingRequired { field: "vcenter" }.into());
        }
        if self.metric_moid_tag.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "metric_moid_tag",
            }
            .into());
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            }
            .into());
        }
        if self.cache_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_interval_secs",
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_interval(&self) -> Duration {
        Duration::from_secs(self.cache_interval_secs)
    }

    /// Build the immutable endpoint descriptor. Credential checks happen
    /// here, in [`Endpoint::new`].
    pub fn endpoint(&self) -> VtagsResult<Endpoint> {
        let mut endpoint = Endpoint::new(&self.vcenter, &self.username, &self.password)?
            .with_insecure_skip_verify(self.insecure_skip_verify)
            .with_timeout(self.timeout());
        if let Some(path) = &self.tls_ca {
            endpoint = endpoint.with_tls_ca(path.clone());
        }
        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtags_core::VtagsError;

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.cache_interval_secs, DEFAULT_CACHE_INTERVAL_SECS);
        assert_eq!(config.metric_moid_tag, DEFAULT_MOID_TAG);
        assert!(config.vsphere_categories.is_empty());
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn test_sample_config_parses_and_validates() {
        let config = ProcessorConfig::from_toml(SAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.vcenter, "https://vcenter.local");
        assert_eq!(config.username, "user@corp.local");
        assert_eq!(config.metric_moid_tag, DEFAULT_MOID_TAG);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = ProcessorConfig::from_toml(
            r#"
            vcenter = "https://vc.example.org"
            username = "svc-telemetry"
            password = "secret"
            timeout_secs = 30
            vsphere_categories = ["Env", "Zone"]
            metric_moid_tag = "vm_moid"
            cache_interval_secs = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.vsphere_categories, vec!["Env", "Zone"]);
        assert_eq!(config.metric_moid_tag, "vm_moid");
        assert_eq!(config.cache_interval_secs, 120);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = ProcessorConfig::from_toml("surprise = true").unwrap_err();
        assert!(matches!(err, VtagsError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_missing_vcenter() {
        let config = ProcessorConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            VtagsError::Config(ConfigError::MissingRequired { field: "vcenter" })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let mut config = ProcessorConfig::from_toml(
            r#"
            vcenter = "https://vc.example.org"
            username = "user"
            password = "secret"
            "#,
        )
        .unwrap();

        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.timeout_secs = DEFAULT_TIMEOUT_SECS;
        config.cache_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_requires_credentials() {
        let config = ProcessorConfig::from_toml(r#"vcenter = "https://vc.example.org""#).unwrap();
        assert!(config.endpoint().is_err());
    }
}
