//! ibmi-rest Client Library
//!
//! HTTP client for the IBM i microservice: SQL queries and statements, CL
//! and Qshell commands, data queues, and a pass-through for any other
//! endpoint. Query results are held as a [`Table`] that can be exported to
//! CSV, XML or JSON.

mod auth;
mod client;
mod transport;

pub use auth::BasicAuth;
pub use client::{Client, LastCall};
pub use ibmirest_core::{
    CallStyle, Column, ColumnType, ConnectionConfig, CoreError, CsvOptions, Endpoint, Table,
};
pub use transport::{HttpExchange, Transport};

/// Broad category of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Remote,
    MalformedResponse,
    Conversion,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP client setup failed: {0}")]
    HttpSetup(#[from] reqwest::Error),

    #[error("ERROR - An HTTP error occurred: {0}")]
    Transport(String),

    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("No table loaded, run a query first")]
    NoTable,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::HttpSetup(_) | ClientError::Core(CoreError::Config(_)) => {
                ErrorKind::Configuration
            }
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Remote(_) => ErrorKind::Remote,
            ClientError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ClientError::NoTable | ClientError::Core(_) => ErrorKind::Conversion,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
