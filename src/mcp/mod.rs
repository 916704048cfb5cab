//! MCP (Model Context Protocol) Server Implementation
//!
//! This module provides a line-delimited JSON-RPC 2.0 server over stdio
//! following the MCP handshake.

pub mod dispatcher;
pub mod errors;
pub mod handlers;
pub mod parser;
pub mod protocol;
pub mod server;
pub mod transport;

pub use dispatcher::{Dispatcher, Handler, HandlerRegistry, HandlerResult};
pub use errors::{HandlerError, ParseError};
pub use protocol::{JsonRpcError, Message, MessageKind, Response};
pub use server::{Lifecycle, McpServer, ShutdownReason};
