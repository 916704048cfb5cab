//! JSON-RPC 2.0 Message Types
//!
//! This module defines the inbound message model and the outbound response
//! shapes used by the stdio server. Classification of an inbound message is
//! derived from which fields are present rather than stored.


use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 version identifier
pub const JSONRPC_VERSION: &str = "2.0";

/// A parsed JSON-RPC message.
///
/// Every field other than `jsonrpc` is optional and taken verbatim from the
/// wire, including a `method` that is not a string. A `null` `method` or `id`
/// is indistinguishable from an absent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// What kind of message this is, by the presence of `method` and `id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Notification,
    Response,
    /// Neither `method` nor `id`
    Malformed,
}

impl Message {
    /// Create a request carrying `id`
    #[inline]
    pub fn request(method: impl Into<String>, params: Option<Value>, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: Some(Value::String(method.into())),
            params,
            id: Some(id),
            result: None,
            error: None,
        }
    }

    /// Create a notification (no `id`)
    #[inline]
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: Some(Value::String(method.into())),
            params,
            id: None,
            result: None,
            error: None,
        }
    }

    /// The method name, if `method` is a string
    #[inline]
    pub fn method_name(&self) -> Option<&str> {
        self.method.as_ref().and_then(Value::as_str)
    }

    #[inline]
    pub fn is_request(&self) -> bool {
        self.method.is_some() && self.id.is_some()
    }

    #[inline]
    pub fn is_notification(&self) -> bool {
        self.method.is_some() && self.id.is_none()
    }

    #[inline]
    pub fn is_response(&self) -> bool {
        self.method.is_none() && self.id.is_some()
    }

    /// Classify the message. `method` always wins over `result`/`error`.
    #[inline]
    pub fn kind(&self) -> MessageKind {
        match (self.method.is_some(), self.id.is_some()) {
            (true, true) => MessageKind::Request,
            (true, false) => MessageKind::Notification,
            (false, true) => MessageKind::Response,
            (false, false) => MessageKind::Malformed,
        }
    }
}

/// JSON-RPC 2.0 Error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// Outbound JSON-RPC 2.0 response, either success or error
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Success {
        jsonrpc: String,
        id: Value,
        result: Value,
    },
    Error {
        jsonrpc: String,
        id: Value,
        error: JsonRpcError,
    },
}

/// Reserved JSON-RPC error codes produced by this server
pub mod error_codes {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl Response {
    /// Create a success response
    #[inline]
    pub fn success(id: Value, result: Value) -> Self {
        Self::Success {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }

    /// Create an error response
    #[inline]
    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self::Error {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error,
        }
    }

    /// The id this response answers
    #[inline]
    pub fn id(&self) -> &Value {
        match self {
            Self::Success { id, .. } | Self::Error { id, .. } => id,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl JsonRpcError {
    /// Create a new JSON-RPC error
    #[inline]
    pub fn new(code: i32, message: String) -> Self {
        Self { code, message }
    }

    /// Create a method not found error
    #[inline]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    /// Method not found for a `method` value that is not a string, named by
    /// its JSON text
    #[inline]
    pub fn method_not_found_value(method: &Value) -> Self {
        match method.as_str() {
            Some(name) => Self::method_not_found(name),
            None => Self::method_not_found(&method.to_string()),
        }
    }

    /// Create an internal error wrapping a failure description
    #[inline]
    pub fn internal_error(description: &str) -> Self {
        Self::new(
            error_codes::INTERNAL_ERROR,
            format!("Internal error: {}", description),
        )
    }

    /// Error sent in place of a response that could not be emitted
    #[inline]
    pub fn serialization_failed() -> Self {
        Self::new(
            error_codes::INTERNAL_ERROR,
            "Response serialization failed".to_string(),
        )
    }
}
