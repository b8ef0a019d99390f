//! HTTP Basic Auth header for the microservice.

use base64::{engine::general_purpose, Engine as _};
use ibmirest_core::ConnectionConfig;
use std::fmt;

/// Basic Auth credentials attached to every request when enabled.
///
/// The pair is normally base64-encoded (RFC 7617). Some gateways in front of
/// the service expect the raw `user:password` text instead, which is what
/// `encode_base64 = false` sends.
#[derive(Clone)]
pub struct BasicAuth {
    user: String,
    password: String,
    encode_base64: bool,
}

impl BasicAuth {
    pub fn new(user: impl Into<String>, password: impl Into<String>, encode_base64: bool) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            encode_base64,
        }
    }

    /// Credentials to use for a request, or `None` when auth is switched off
    pub fn from_config(config: &ConnectionConfig) -> Option<Self> {
        config.use_http_credentials.then(|| {
            Self::new(
                config.http_user(),
                config.http_password(),
                config.base64_encode_auth,
            )
        })
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.user, self.password);
        if self.encode_base64 {
            format!("Basic {}", general_purpose::STANDARD.encode(credentials.as_bytes()))
        } else {
            format!("Basic {}", credentials)
        }
    }

    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, self.header_value())
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"***")
            .field("encode_base64", &self.encode_base64)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_header() {
        let auth = BasicAuth::new("DEVUSER", "s3cret!", true);
        assert_eq!(auth.header_value(), "Basic REVWVVNFUjpzM2NyZXQh");

        let encoded = auth.header_value().trim_start_matches("Basic ").to_string();
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, b"DEVUSER:s3cret!");
    }

    #[test]
    fn test_raw_header() {
        let auth = BasicAuth::new("DEVUSER", "s3cret!", false);
        assert_eq!(auth.header_value(), "Basic DEVUSER:s3cret!");
    }

    #[test]
    fn test_from_config() {
        let mut config = ConnectionConfig::new("http://host");
        config.user = "HOSTUSR".to_string();
        config.password = "hostpw".to_string();
        assert!(BasicAuth::from_config(&config).is_none());

        config.use_http_credentials = true;
        let auth = BasicAuth::from_config(&config).unwrap();
        assert_eq!(auth.header_value(), "Basic SE9TVFVTUjpob3N0cHc=");

        config.http_user = Some("web".to_string());
        config.http_password = Some("pw".to_string());
        let auth = BasicAuth::from_config(&config).unwrap();
        assert_eq!(auth.header_value(), "Basic d2ViOnB3");
    }

    #[test]
    fn test_debug_hides_password() {
        let auth = BasicAuth::new("u", "topsecret", true);
        assert!(!format!("{:?}", auth).contains("topsecret"));
    }
}
