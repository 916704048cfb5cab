//! Built-in protocol handlers
//!
//! The handshake (`initialize` followed by the `notifications/initialized`
//! notification) and the `ping` connectivity probe. Everything else is plugged
//! in by collaborators through [`HandlerRegistry::register`].

#[cfg(test)]
mod tests;

use crate::config::ServerConfig;
use crate::mcp::dispatcher::{Handler, HandlerRegistry, HandlerResult};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

pub const INITIALIZE: &str = "initialize";
pub const INITIALIZED: &str = "notifications/initialized";
pub const PING: &str = "ping";

/// Result of the `initialize` request
#[derive(Debug, Clone, Serialize)]
pub struct InitializeResult {
    pub protocol: ProtocolInfo,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: Implementation,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProtocolInfo {
    pub version: String,
}

/// Capability categories the server declares
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
    pub resources: ResourcesCapability,
    pub prompts: PromptsCapability,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Clone, Serialize)]
pub struct ResourcesCapability {}

#[derive(Debug, Clone, Serialize)]
pub struct PromptsCapability {}

/// Implementation information
#[derive(Debug, Clone, Serialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Answers `initialize` with a fixed descriptor and records that the
/// handshake happened
pub struct InitializeHandler {
    result: InitializeResult,
    initialized: Arc<AtomicBool>,
}

impl InitializeHandler {
    #[inline]
    pub fn new(server: &ServerConfig, initialized: Arc<AtomicBool>) -> Self {
        let result = InitializeResult {
            protocol: ProtocolInfo {
                version: server.protocol_version.clone(),
            },
            capabilities: ServerCapabilities {
                tools: ToolsCapability {},
                resources: ResourcesCapability {},
                prompts: PromptsCapability {},
            },
            server_info: Implementation {
                name: server.name.clone(),
                version: server.version.clone(),
            },
        };

        Self {
            result,
            initialized,
        }
    }
}

impl Handler for InitializeHandler {
    #[inline]
    fn handle(&self, _params: Option<&Value>, _id: Option<&Value>) -> HandlerResult {
        info!("Handling initialize request");
        let result = serde_json::to_value(&self.result)?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(result)
    }
}

/// Acknowledge the client's `notifications/initialized`
#[inline]
pub fn handle_initialized(_params: Option<&Value>, _id: Option<&Value>) -> HandlerResult {
    info!("Received initialized notification");
    Ok(Value::Null)
}

#[inline]
pub fn handle_ping(_params: Option<&Value>, _id: Option<&Value>) -> HandlerResult {
    debug!("Handling ping request");
    Ok(json!({ "status": "pong" }))
}

/// Register the built-in handlers into `registry`
#[inline]
pub fn register_builtins(
    registry: &mut HandlerRegistry,
    server: &ServerConfig,
    initialized: &Arc<AtomicBool>,
) {
    registry.register(
        INITIALIZE,
        InitializeHandler::new(server, Arc::clone(initialized)),
    );
    registry.register(INITIALIZED, handle_initialized);
    registry.register(PING, handle_ping);
}
