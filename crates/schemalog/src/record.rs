//! Log records and error payload helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Level;

/// A single structured log record.
///
/// Alongside the call's message key and validated metadata, every record
/// carries the default metadata attached at construction: the wrapper
/// package name, the process id and the commit hash of the running build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: Level,
    /// Service that produced the record.
    pub service: String,
    /// Application name.
    pub name: String,
    /// Process id.
    pub pid: u32,
    /// Commit hash of the running build.
    pub commit_hash: String,
    /// Message key.
    pub message: String,
    /// Validated (or fallback) metadata. Omitted from serialized output
    /// when the call carried none.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub meta: Value,
}

/// Serializable rendering of an error and its `source()` chain.
///
/// Intended as the `error` field of error-level metadata, so causal chains
/// survive JSON transport instead of flattening to a single message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Top-level error message.
    pub message: String,
    /// Messages of the causal chain, outermost cause first. Omitted when
    /// the error has no source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}

impl ErrorDetails {
    /// Capture an error, walking its `source()` chain.
    #[must_use]
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: error.to_string(),
            chain,
        }
    }
}
