//! Method dispatch
//!
//! Routes requests and notifications to registered handlers by method name
//! and applies the JSON-RPC response policy: requests always get exactly one
//! response, notifications never get one.


use crate::mcp::errors::HandlerError;
use crate::mcp::protocol::{JsonRpcError, Message, MessageKind, Response};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

pub type HandlerResult = std::result::Result<Value, HandlerError>;

/// Implementation of a single RPC method.
///
/// Receives the message's `params` and `id` (the latter is `None` for
/// notifications). Any plain function or closure with that signature is a
/// handler.
pub trait Handler: Send + Sync {
    fn handle(&self, params: Option<&Value>, id: Option<&Value>) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(Option<&Value>, Option<&Value>) -> HandlerResult + Send + Sync,
{
    #[inline]
    fn handle(&self, params: Option<&Value>, id: Option<&Value>) -> HandlerResult {
        self(params, id)
    }
}

/// Method name to handler mapping
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl HandlerRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method`, replacing any previous registration
    #[inline]
    pub fn register<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: Handler + 'static,
    {
        let method = method.into();
        if self.handlers.insert(method.clone(), Box::new(handler)).is_some() {
            debug!("Replaced handler: {}", method);
        } else {
            debug!("Registered handler: {}", method);
        }
    }

    /// Register a closure for `method`, replacing any previous registration
    #[inline]
    pub fn register_fn<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<&Value>, Option<&Value>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(method, handler);
    }

    #[inline]
    pub fn get(&self, method: &str) -> Option<&dyn Handler> {
        self.handlers.get(method).map(|handler| handler.as_ref())
    }

    #[inline]
    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted
    #[inline]
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Routes parsed messages to the handlers in a [`HandlerRegistry`]
#[derive(Default)]
pub struct Dispatcher {
    registry: HandlerRegistry,
}

impl Dispatcher {
    #[inline]
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    #[inline]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Dispatch a message, returning the response to send if any.
    ///
    /// Inbound responses and messages with neither `method` nor `id` are
    /// logged and dropped.
    #[inline]
    pub fn dispatch(&self, message: &Message) -> Option<Response> {
        match message.kind() {
            MessageKind::Response => {
                warn!("Received response message - ignoring");
                return None;
            }
            MessageKind::Malformed => {
                error!("Message is neither a request nor a notification");
                return None;
            }
            MessageKind::Request | MessageKind::Notification => {}
        }

        let Some(method) = message.method_name() else {
            let method = message.method.as_ref()?;
            error!("No handler for non-string method: {}", method);
            return message
                .id
                .clone()
                .map(|id| Response::error(id, JsonRpcError::method_not_found_value(method)));
        };
        info!("Dispatch method: {}", method);

        let Some(handler) = self.registry.get(method) else {
            error!("No handler for method: {}", method);
            return message
                .id
                .clone()
                .map(|id| Response::error(id, JsonRpcError::method_not_found(method)));
        };

        match invoke(handler, message.params.as_ref(), message.id.as_ref()) {
            Ok(result) => message.id.clone().map(|id| Response::success(id, result)),
            Err(e) => {
                error!("Handler error for {}: {} ({:?})", method, e, e);
                message
                    .id
                    .clone()
                    .map(|id| Response::error(id, JsonRpcError::internal_error(&e.to_string())))
            }
        }
    }
}

fn invoke(handler: &dyn Handler, params: Option<&Value>, id: Option<&Value>) -> HandlerResult {
    panic::catch_unwind(AssertUnwindSafe(|| handler.handle(params, id)))
        .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(payload.as_ref()))))
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
