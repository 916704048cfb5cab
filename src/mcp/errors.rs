//! MCP Error Handling
//!
//! Failures that can occur while turning a raw line into a message, and
//! failures raised by method handlers. Neither ever escapes the run loop:
//! parse failures are logged and skipped, handler failures become JSON-RPC
//! error responses for requests.

use serde_json::Value;
use thiserror::Error;

/// Reasons a raw input line was rejected before becoming a message
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON decode error: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Message is not a JSON object")]
    NotAnObject,

    #[error("Invalid jsonrpc version: {}", display_version(.0.as_ref()))]
    UnsupportedVersion(Option<Value>),

    #[error("Invalid message shape: {0}")]
    InvalidShape(#[source] serde_json::Error),
}

fn display_version(version: Option<&Value>) -> String {
    version.map_or_else(|| "None".to_string(), Value::to_string)
}

/// Failure signalled by a method handler
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Handler panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Create a plain failure with the given description
    #[inline]
    pub fn failed(description: impl Into<String>) -> Self {
        Self::Failed(description.into())
    }
}
