use crate::auth::BasicAuth;
use crate::transport::Transport;
use crate::{ClientError, Result};
use ibmirest_core::classify::{self, CallStyle, Outcome};
use ibmirest_core::extract::{self, JsonScalar};
use ibmirest_core::{
    CommandRequest, ConnectionConfig, CsvOptions, DataQueuePopRequest, DataQueuePopResponse,
    DataQueueSendRequest, Endpoint, SqlRequest, Table,
};
use serde::Serialize;
use std::path::Path;

/// Diagnostics from the most recent operation.
///
/// Reset when an operation starts and filled in when it completes, whether
/// it succeeded or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastCall {
    pub error: Option<String>,
    pub json_response: String,
    pub http_status: String,
    pub http_response: String,
}

/// IBM i microservice client.
///
/// Every operation takes `&mut self`: one call is in flight per client, and
/// its diagnostics stay readable until the next call starts.
pub struct Client {
    config: ConnectionConfig,
    transport: Transport,
    last: LastCall,
    table: Option<Table>,
}

impl Client {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::new(config.allow_invalid_cert)?;

        Ok(Self {
            config,
            transport,
            last: LastCall::default(),
            table: None,
        })
    }

    /// Create a client with default settings for the given base URL
    pub fn connect(base_url: impl Into<String>) -> Result<Self> {
        Self::new(ConnectionConfig::new(base_url))
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn set_url(&mut self, base_url: impl Into<String>) -> Result<()> {
        self.begin();
        let mut candidate = self.config.clone();
        candidate.base_url = base_url.into();
        let result = candidate.validate().map_err(ClientError::from);
        if result.is_ok() {
            self.config = candidate;
        }
        self.finish(result)
    }

    /// Host credentials. Also used for HTTP auth unless separate HTTP
    /// credentials are set.
    pub fn set_user_info(
        &mut self,
        user: impl Into<String>,
        password: impl Into<String>,
        use_http_credentials: bool,
    ) {
        self.begin();
        self.config.user = user.into();
        self.config.password = password.into();
        self.config.use_http_credentials = use_http_credentials;
    }

    pub fn set_http_user_info(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.begin();
        self.config.http_user = Some(user.into());
        self.config.http_password = Some(password.into());
    }

    pub fn set_base64_encode_auth(&mut self, encode: bool) {
        self.begin();
        self.config.base64_encode_auth = encode;
    }

    /// Rebuilds this client's transport; other clients are unaffected
    pub fn set_allow_invalid_cert(&mut self, allow: bool) -> Result<()> {
        self.begin();
        let result = Transport::new(allow).map_err(ClientError::from);
        let result = result.map(|transport| {
            self.transport = transport;
            self.config.allow_invalid_cert = allow;
        });
        self.finish(result)
    }

    pub fn set_timeout_ms(&mut self, timeout_ms: u64) -> Result<()> {
        self.begin();
        let mut candidate = self.config.clone();
        candidate.timeout_ms = timeout_ms;
        let result = candidate.validate().map_err(ClientError::from);
        if result.is_ok() {
            self.config = candidate;
        }
        self.finish(result)
    }

    // --- Last-call diagnostics ---

    pub fn last_call(&self) -> &LastCall {
        &self.last
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last.error.as_deref()
    }

    pub fn last_json_response(&self) -> &str {
        &self.last.json_response
    }

    pub fn last_http_status(&self) -> &str {
        &self.last.http_status
    }

    pub fn last_http_response(&self) -> &str {
        &self.last.http_response
    }

    // --- SQL ---

    /// Run a select and hold its result set. Any previously held table is
    /// dropped first, so a failed query leaves no table behind.
    pub async fn execute_query(&mut self, sql: &str) -> Result<&Table> {
        self.begin();
        self.table = None;

        let result = match self
            .call(Endpoint::Sql, &SqlRequest::select(sql), CallStyle::Query)
            .await
        {
            Ok(text) => Table::from_json(&text).map_err(ClientError::from),
            Err(e) => Err(e),
        };

        let table = self.finish(result)?;
        tracing::debug!(rows = table.row_count(), columns = table.column_count(), "Query complete");
        Ok(&*self.table.insert(table))
    }

    /// Run an insert, update, delete or DDL statement
    pub async fn execute_non_query(&mut self, sql: &str) -> Result<()> {
        self.begin();
        let result = self
            .call(Endpoint::Sql, &SqlRequest::non_query(sql), CallStyle::Command)
            .await
            .map(|_| ());
        self.finish(result)
    }

    // --- Commands ---

    /// Run a CL command
    pub async fn execute_command(&mut self, command: &str) -> Result<()> {
        self.begin();
        let result = self
            .call(Endpoint::Cl, &CommandRequest { command }, CallStyle::Command)
            .await
            .map(|_| ());
        self.finish(result)
    }

    /// Run a Qshell command
    pub async fn execute_qsh(&mut self, command: &str) -> Result<()> {
        self.begin();
        let result = self
            .call(Endpoint::Qsh, &CommandRequest { command }, CallStyle::Command)
            .await
            .map(|_| ());
        self.finish(result)
    }

    // --- Data queues ---

    pub async fn send_data_queue(&mut self, library: &str, object: &str, data: &str) -> Result<()> {
        self.begin();
        let request = DataQueueSendRequest {
            library,
            object,
            data,
        };
        let result = self
            .call(Endpoint::DataQueueSend, &request, CallStyle::Command)
            .await
            .map(|_| ());
        self.finish(result)
    }

    /// Receive the next entry. `None` when the queue had nothing to give.
    pub async fn pop_data_queue(&mut self, library: &str, object: &str) -> Result<Option<String>> {
        self.begin();
        let request = DataQueuePopRequest { library, object };
        let result = match self
            .call(Endpoint::DataQueuePop, &request, CallStyle::Command)
            .await
        {
            Ok(text) => serde_json::from_str::<DataQueuePopResponse>(&text)
                .map(|response| response.value_text())
                .map_err(|e| ClientError::MalformedResponse(format!("Invalid data queue response: {}", e))),
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    // --- Pass-through ---

    /// POST any JSON body to any endpoint and return the raw response text.
    /// Fails on a transport error, an explicit failure marker or an empty body.
    pub async fn execute_endpoint<B>(&mut self, endpoint: &str, body: &B) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        self.begin();
        let result = self
            .call(Endpoint::from(endpoint), body, CallStyle::Query)
            .await;
        self.finish(result)
    }

    // --- Held table ---

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn take_table(&mut self) -> Option<Table> {
        self.table.take()
    }

    pub fn table_to_csv(&mut self, options: &CsvOptions) -> Result<String> {
        self.with_table(|table| Ok(table.to_csv(options)))
    }

    pub fn table_to_xml(&mut self, table_name: &str, include_schema: bool) -> Result<String> {
        self.with_table(|table| Ok(table.to_xml(table_name, include_schema)))
    }

    pub fn table_to_json(&mut self, pretty: bool) -> Result<String> {
        self.with_table(|table| table.to_json(pretty))
    }

    pub fn table_to_list(&mut self, include_header: bool) -> Result<Vec<Vec<serde_json::Value>>> {
        self.with_table(|table| Ok(table.rows_as_list(include_header)))
    }

    pub fn write_table_csv(
        &mut self,
        path: impl AsRef<Path>,
        options: &CsvOptions,
        replace: bool,
    ) -> Result<()> {
        self.with_table(|table| table.write_csv(path, options, replace))
    }

    pub fn write_table_xml(
        &mut self,
        path: impl AsRef<Path>,
        table_name: &str,
        include_schema: bool,
        replace: bool,
    ) -> Result<()> {
        self.with_table(|table| table.write_xml(path, table_name, include_schema, replace))
    }

    pub fn write_table_json(&mut self, path: impl AsRef<Path>, pretty: bool, replace: bool) -> Result<()> {
        self.with_table(|table| table.write_json(path, pretty, replace))
    }

    // --- JSON extraction ---

    /// Typed value at `path`, or the type's zero value. The reason for a
    /// fallback is left in [`Client::last_error`].
    pub fn get_json_value<T: JsonScalar>(&mut self, json_text: &str, path: &str) -> T {
        self.try_get_json_value(json_text, path).unwrap_or_default()
    }

    /// Typed value at `path`, with an error when it is absent or of the
    /// wrong type
    pub fn try_get_json_value<T: JsonScalar>(&mut self, json_text: &str, path: &str) -> Result<T> {
        self.begin();
        let result = extract::extract(json_text, path).map_err(ClientError::from);
        self.finish(result)
    }

    // --- internals ---

    fn begin(&mut self) {
        self.last = LastCall::default();
    }

    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::warn!(kind = ?e.kind(), "{}", e);
            self.last.error = Some(e.to_string());
        }
        result
    }

    fn with_table<T>(
        &mut self,
        op: impl FnOnce(&Table) -> ibmirest_core::error::Result<T>,
    ) -> Result<T> {
        self.begin();
        let result = match &self.table {
            Some(table) => op(table).map_err(ClientError::from),
            None => Err(ClientError::NoTable),
        };
        self.finish(result)
    }

    /// Serialize, send, record diagnostics, classify
    #[tracing::instrument(skip(self, endpoint, body), fields(endpoint = %endpoint.path()))]
    async fn call<B>(&mut self, endpoint: Endpoint, body: &B, style: CallStyle) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(body).map_err(ibmirest_core::CoreError::from)?;
        let url = self.config.endpoint_url(endpoint.path());
        let auth = BasicAuth::from_config(&self.config);

        tracing::debug!(url = %url, bytes = payload.len(), auth = auth.is_some(), "Sending request");

        let exchange = self
            .transport
            .post(&url, payload, self.config.timeout(), auth.as_ref())
            .await;

        let text = exchange.response_text();
        self.last.http_status = exchange.status_line;
        self.last.http_response = exchange.body;
        self.last.json_response = text.clone();

        match classify::outcome(&text, style) {
            Outcome::Success => Ok(text),
            Outcome::TransportFailure(message) => Err(ClientError::Transport(message)),
            Outcome::RemoteFailure(message) => Err(ClientError::Remote(message)),
            Outcome::Malformed(message) => Err(ClientError::MalformedResponse(message)),
        }
    }
}
