//! Message Parser
//!
//! Turns one raw input line into a validated [`Message`]. Every rejection is
//! logged here, so callers only need to skip the line.


use crate::mcp::errors::ParseError;
use crate::mcp::protocol::{JSONRPC_VERSION, Message};
use serde_json::Value;
use tracing::{debug, error};

/// Parse a raw line as a JSON-RPC 2.0 message
#[inline]
pub fn parse_message(raw_line: &str) -> Result<Message, ParseError> {
    let result = decode(raw_line);
    if let Err(ref e) = result {
        error!("{}", e);
        if matches!(e, ParseError::InvalidJson(_)) {
            error!("Invalid JSON line: {}", raw_line);
        }
    }
    result
}

fn decode(raw_line: &str) -> Result<Message, ParseError> {
    let data: Value = serde_json::from_str(raw_line).map_err(ParseError::InvalidJson)?;
    debug!("Parsed JSON: {}", data);

    let Value::Object(object) = data else {
        return Err(ParseError::NotAnObject);
    };

    match object.get("jsonrpc") {
        Some(Value::String(version)) if version == JSONRPC_VERSION => {}
        other => return Err(ParseError::UnsupportedVersion(other.cloned())),
    }

    let message: Message =
        serde_json::from_value(Value::Object(object)).map_err(ParseError::InvalidShape)?;

    debug!(
        "Created message: request={}, notification={}, response={}",
        message.is_request(),
        message.is_notification(),
        message.is_response()
    );

    Ok(message)
}
