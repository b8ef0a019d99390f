//! Success/failure classification of raw microservice responses.
//!
//! The service reports outcome through a boolean `success` field, but select
//! statements return a bare array of rows with no marker at all. The checks
//! therefore work on the raw text rather than on a parsed document, in this
//! order: transport sentinel, failure marker, success marker, empty body.

/// Prefix the transport puts in front of any HTTP-level failure message
pub const TRANSPORT_ERROR_PREFIX: &str = "ERROR - An HTTP error occurred: ";

/// Message used when a response carries no text at all
pub const EMPTY_RESPONSE_MESSAGE: &str = "Empty response, most likely no data returned";

const FAILURE_MARKERS: [&str; 2] = [r#""success":false"#, r#""success": false"#];
const SUCCESS_MARKERS: [&str; 2] = [r#""success":true"#, r#""success": true"#];

/// How an unmarked, non-empty response should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// SQL selects: row data with no marker counts as success
    Query,
    /// Commands and non-query statements: an explicit success marker is required
    Command,
}

/// Raw classification of a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The transport could not complete the exchange
    TransportFailure(String),
    /// `"success":false` is present
    RemoteFailure(String),
    /// `"success":true` is present and no failure marker is
    Success,
    /// Empty or whitespace-only body
    Empty,
    /// Non-empty body without either marker
    Unmarked,
}

/// Final decision for a call, after applying the call style
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    TransportFailure(String),
    RemoteFailure(String),
    Malformed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

pub fn classify(text: &str) -> Verdict {
    if let Some(message) = text.strip_prefix(TRANSPORT_ERROR_PREFIX) {
        return Verdict::TransportFailure(message.to_string());
    }
    if FAILURE_MARKERS.iter().any(|m| text.contains(m)) {
        return Verdict::RemoteFailure(failure_message(text));
    }
    if SUCCESS_MARKERS.iter().any(|m| text.contains(m)) {
        return Verdict::Success;
    }
    if text.trim().is_empty() {
        return Verdict::Empty;
    }
    Verdict::Unmarked
}

impl Verdict {
    pub fn resolve(self, style: CallStyle) -> Outcome {
        match self {
            Verdict::Success => Outcome::Success,
            Verdict::TransportFailure(msg) => Outcome::TransportFailure(msg),
            Verdict::RemoteFailure(msg) => Outcome::RemoteFailure(msg),
            Verdict::Empty => Outcome::Malformed(EMPTY_RESPONSE_MESSAGE.to_string()),
            Verdict::Unmarked => match style {
                CallStyle::Query => Outcome::Success,
                CallStyle::Command => Outcome::Malformed(
                    "Response did not contain a success indicator".to_string(),
                ),
            },
        }
    }
}

/// Classify and resolve in one step
pub fn outcome(text: &str, style: CallStyle) -> Outcome {
    classify(text).resolve(style)
}

/// Build a failure message from whatever detail fields the service sent
fn failure_message(text: &str) -> String {
    let base = "Remote service reported failure";

    let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(text)
    else {
        return base.to_string();
    };

    let details: Vec<String> = ["message", "error", "code"]
        .iter()
        .filter_map(|key| {
            map.get(*key).and_then(|v| match v {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) if s.trim().is_empty() => None,
                serde_json::Value::String(s) => Some(format!("{}: {}", key, s.trim())),
                other => Some(format!("{}: {}", key, other)),
            })
        })
        .collect();

    if details.is_empty() {
        base.to_string()
    } else {
        format!("{} ({})", base, details.join(", "))
    }
}
