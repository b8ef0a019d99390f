use ibmirest_core::classify::TRANSPORT_ERROR_PREFIX;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, StatusCode};
use std::time::Duration;

use crate::auth::BasicAuth;

pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Outcome of a single POST. Transport problems are recorded here instead
/// of being returned as errors, so the caller always has status and body
/// text to report.
#[derive(Debug, Clone, Default)]
pub struct HttpExchange {
    pub status: Option<u16>,
    pub status_line: String,
    pub body: String,
    pub error: Option<String>,
}

impl HttpExchange {
    fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }

    /// Text handed to the response classifier: the body on a 200, nothing
    /// for any other 2xx, otherwise the error message behind the transport
    /// sentinel prefix.
    pub fn response_text(&self) -> String {
        match &self.error {
            Some(message) => format!("{}{}", TRANSPORT_ERROR_PREFIX, message),
            None if self.status == Some(StatusCode::OK.as_u16()) => self.body.clone(),
            None => String::new(),
        }
    }
}

/// HTTP transport owned by one client, with its own TLS policy
pub struct Transport {
    http: HttpClient,
    allow_invalid_cert: bool,
}

impl Transport {
    pub fn new(allow_invalid_cert: bool) -> Result<Self, reqwest::Error> {
        let http = HttpClient::builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .danger_accept_invalid_certs(allow_invalid_cert)
            .build()?;

        Ok(Self {
            http,
            allow_invalid_cert,
        })
    }

    pub fn allows_invalid_cert(&self) -> bool {
        self.allow_invalid_cert
    }

    /// POST a JSON body. Never fails: errors end up in the exchange.
    pub async fn post(
        &self,
        url: &str,
        body: String,
        timeout: Duration,
        auth: Option<&BasicAuth>,
    ) -> HttpExchange {
        let mut request = self
            .http
            .post(url)
            .timeout(timeout)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body);

        if let Some(auth) = auth {
            request = auth.apply_to_request(request);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, "HTTP request failed: {}", e);
                return HttpExchange::failed(describe(&e));
            }
        };

        let status = response.status();
        let status_line = format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string();

        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(url = %url, status = %status_line, "Failed to read response body: {}", e);
                return HttpExchange {
                    status: Some(status.as_u16()),
                    status_line,
                    body: String::new(),
                    error: Some(describe(&e)),
                };
            }
        };

        tracing::debug!(url = %url, status = %status_line, bytes = body.len(), "HTTP response received");

        let error = (!status.is_success())
            .then(|| format!("The remote server returned an error: ({})", status_line));

        HttpExchange {
            status: Some(status.as_u16()),
            status_line,
            body,
            error,
        }
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "The operation has timed out".to_string()
    } else {
        e.to_string()
    }
}
