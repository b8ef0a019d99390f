//! ibmi-rest Core Library
//!
//! Transport-independent pieces of the IBM i microservice client:
//! - Connection configuration
//! - Request and response models for each endpoint
//! - Response classification (success / failure / empty)
//! - Tabular result sets and their CSV, XML and JSON exports
//! - Typed scalar extraction from JSON documents

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod table;

// Re-export commonly used types
pub use classify::{CallStyle, Outcome, Verdict};
pub use config::ConnectionConfig;
pub use error::CoreError;
pub use export::CsvOptions;
pub use extract::{JsonPath, JsonScalar};
pub use models::*;
pub use table::{Column, ColumnType, Table};
