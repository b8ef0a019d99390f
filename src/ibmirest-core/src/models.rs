use serde::{Deserialize, Serialize};

/// Endpoints exposed by the IBM i microservice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Sql,
    Cl,
    Qsh,
    DataQueueSend,
    DataQueuePop,
    Call,
    Transaction,
    Custom(String),
}

impl Endpoint {
    pub fn path(&self) -> &str {
        match self {
            Endpoint::Sql => "sql",
            Endpoint::Cl => "cl",
            Endpoint::Qsh => "qsh",
            Endpoint::DataQueueSend => "dq/send",
            Endpoint::DataQueuePop => "dq/pop",
            Endpoint::Call => "call",
            Endpoint::Transaction => "transaction",
            Endpoint::Custom(name) => name.trim_matches('/'),
        }
    }
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        match name.trim_matches('/') {
            "sql" => Endpoint::Sql,
            "cl" => Endpoint::Cl,
            "qsh" => Endpoint::Qsh,
            "dq/send" => Endpoint::DataQueueSend,
            "dq/pop" => Endpoint::DataQueuePop,
            "call" => Endpoint::Call,
            "transaction" => Endpoint::Transaction,
            other => Endpoint::Custom(other.to_string()),
        }
    }
}

/// Statement mode understood by the `/sql` endpoint. Selects omit the field.
pub const SQL_MODE_NON_QUERY: u8 = 2;

/// SqlRequest is the body sent to `/sql`
#[derive(Debug, Clone, Serialize)]
pub struct SqlRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u8>,
    pub query: &'a str,
}

impl<'a> SqlRequest<'a> {
    pub fn select(query: &'a str) -> Self {
        Self { mode: None, query }
    }

    pub fn non_query(query: &'a str) -> Self {
        Self {
            mode: Some(SQL_MODE_NON_QUERY),
            query,
        }
    }
}

/// CommandRequest is the body sent to `/cl` and `/qsh`
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest<'a> {
    pub command: &'a str,
}

/// DataQueueSendRequest is the body sent to `/dq/send`
#[derive(Debug, Clone, Serialize)]
pub struct DataQueueSendRequest<'a> {
    pub library: &'a str,
    pub object: &'a str,
    pub data: &'a str,
}

/// DataQueuePopRequest is the body sent to `/dq/pop`
#[derive(Debug, Clone, Serialize)]
pub struct DataQueuePopRequest<'a> {
    pub library: &'a str,
    pub object: &'a str,
}

/// DataQueuePopResponse is the reply from `/dq/pop`
#[derive(Debug, Clone, Deserialize)]
pub struct DataQueuePopResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl DataQueuePopResponse {
    /// The popped entry as text. Null or absent means the queue was empty.
    pub fn value_text(&self) -> Option<String> {
        match &self.value {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sql_request_bodies() {
        let select = serde_json::to_value(SqlRequest::select("SELECT * FROM QIWS.QCUSTCDT")).unwrap();
        assert_eq!(select, json!({"query": "SELECT * FROM QIWS.QCUSTCDT"}));

        let update = serde_json::to_string(&SqlRequest::non_query("DELETE FROM T1")).unwrap();
        assert_eq!(update, r#"{"mode":2,"query":"DELETE FROM T1"}"#);
    }

    #[test]
    fn test_request_text_is_escaped() {
        let body = serde_json::to_string(&CommandRequest {
            command: "SNDMSG MSG('say \"hi\"\n') TOUSR(QSYSOPR)",
        })
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            parsed["command"],
            json!("SNDMSG MSG('say \"hi\"\n') TOUSR(QSYSOPR)")
        );
    }

    #[test]
    fn test_data_queue_bodies() {
        let send = serde_json::to_value(DataQueueSendRequest {
            library: "QGPL",
            object: "MYDQ",
            data: "hello",
        })
        .unwrap();
        assert_eq!(send, json!({"library": "QGPL", "object": "MYDQ", "data": "hello"}));

        let pop = serde_json::to_value(DataQueuePopRequest {
            library: "QGPL",
            object: "MYDQ",
        })
        .unwrap();
        assert_eq!(pop, json!({"library": "QGPL", "object": "MYDQ"}));
    }

    #[test]
    fn test_pop_response_value_text() {
        let resp: DataQueuePopResponse =
            serde_json::from_str(r#"{"success":true,"value":"ORDER 42"}"#).unwrap();
        assert_eq!(resp.value_text(), Some("ORDER 42".to_string()));

        let empty: DataQueuePopResponse =
            serde_json::from_str(r#"{"success":true,"value":null}"#).unwrap();
        assert_eq!(empty.value_text(), None);

        let numeric: DataQueuePopResponse =
            serde_json::from_str(r#"{"success":true,"value":17}"#).unwrap();
        assert_eq!(numeric.value_text(), Some("17".to_string()));
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::from("/dq/send"), Endpoint::DataQueueSend);
        assert_eq!(Endpoint::from("transaction").path(), "transaction");
        assert_eq!(Endpoint::from("/custom/op/").path(), "custom/op");
    }
}
