use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Connection settings for one IBM i microservice client.
///
/// The HTTP-auth credentials fall back to the host credentials when they are
/// not set explicitly.
#[derive(Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    pub base_url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_password: Option<String>,

    /// Send an `Authorization: Basic` header with every request
    #[serde(default)]
    pub use_http_credentials: bool,

    /// Base64-encode the `user:password` pair in the auth header.
    /// When off, the pair is sent as-is (some gateways expect this).
    #[serde(default = "default_base64_encode_auth")]
    pub base64_encode_auth: bool,

    /// Accept any server certificate. Scoped to this client only.
    #[serde(default)]
    pub allow_invalid_cert: bool,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base64_encode_auth() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    100_000
}

impl ConnectionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ConnectionConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(CoreError::Config("base URL must not be empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(CoreError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL for an endpoint name, tolerating slashes on either side
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    pub fn http_user(&self) -> &str {
        self.http_user.as_deref().unwrap_or(&self.user)
    }

    pub fn http_password(&self) -> &str {
        self.http_password.as_deref().unwrap_or(&self.password)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("password", &"***")
            .field("http_user", &self.http_user)
            .field("http_password", &self.http_password.as_ref().map(|_| "***"))
            .field("use_http_credentials", &self.use_http_credentials)
            .field("base64_encode_auth", &self.base64_encode_auth)
            .field("allow_invalid_cert", &self.allow_invalid_cert)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3030".to_string(),
            user: String::new(),
            password: String::new(),
            http_user: None,
            http_password: None,
            use_http_credentials: false,
            base64_encode_auth: default_base64_encode_auth(),
            allow_invalid_cert: false,
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"base_url": "https://ibmi.example.com:3030"}"#).unwrap();
        assert!(config.base64_encode_auth);
        assert!(!config.use_http_credentials);
        assert!(!config.allow_invalid_cert);
        assert_eq!(config.timeout_ms, 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_hides_passwords() {
        let mut config = ConnectionConfig::new("http://host");
        config.user = "QSECOFR".to_string();
        config.password = "hostpw".to_string();
        config.http_password = Some("webpw".to_string());

        let printed = format!("{:?}", config);
        assert!(printed.contains("QSECOFR"));
        assert!(!printed.contains("hostpw"));
        assert!(!printed.contains("webpw"));
    }

    #[test]
    fn test_http_credentials_fall_back_to_host_credentials() {
        let mut config = ConnectionConfig::new("http://host");
        config.user = "QSECOFR".to_string();
        config.password = "secret".to_string();
        assert_eq!(config.http_user(), "QSECOFR");
        assert_eq!(config.http_password(), "secret");

        config.http_user = Some("web".to_string());
        config.http_password = Some("webpw".to_string());
        assert_eq!(config.http_user(), "web");
        assert_eq!(config.http_password(), "webpw");
    }

    #[test]
    fn test_endpoint_url_joins_slashes() {
        let config = ConnectionConfig::new("http://host:3030/");
        assert_eq!(config.endpoint_url("/sql"), "http://host:3030/sql");
        assert_eq!(config.endpoint_url("dq/pop"), "http://host:3030/dq/pop");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(ConnectionConfig::new("").validate().is_err());
        assert!(ConnectionConfig::new("ftp://host").validate().is_err());

        let mut config = ConnectionConfig::new("http://host");
        config.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"base_url": "http://ibmi:3030", "user": "DEV", "timeout_ms": 5000}"#,
        )
        .unwrap();

        let config = ConnectionConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.user, "DEV");
        assert_eq!(config.timeout(), Duration::from_millis(5000));
    }
}
