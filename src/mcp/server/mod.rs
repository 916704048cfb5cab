//! MCP Server Implementation
//!
//! Owns the handler registry and the server state and drives the
//! read, parse, dispatch, write, flush cycle one message at a time until the
//! input ends or an interrupt arrives.


use crate::config::ServerConfig;
use crate::mcp::dispatcher::{Dispatcher, Handler, HandlerRegistry, HandlerResult, panic_message};
use crate::mcp::handlers::register_builtins;
use crate::mcp::parser::parse_message;
use crate::mcp::transport::{LineReader, ResponseWriter};
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::{error, info};

/// Lifecycle of the run loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Running,
    ShuttingDown,
    Stopped,
}

/// Why the run loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    EndOfStream,
    Interrupted,
    /// A panic escaped an iteration
    Fault,
}

/// Flags owned by the run loop
#[derive(Debug, Default)]
pub struct ServerState {
    running: bool,
    initialized: Arc<AtomicBool>,
}

impl ServerState {
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether `initialize` has been handled. Informational only.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

/// Line-delimited JSON-RPC server
pub struct McpServer {
    dispatcher: Dispatcher,
    state: ServerState,
    lifecycle: Lifecycle,
}

impl McpServer {
    /// Create a server with the built-in handlers registered
    #[inline]
    pub fn new(server: &ServerConfig) -> Self {
        let state = ServerState::default();
        let mut registry = HandlerRegistry::new();
        register_builtins(&mut registry, server, &state.initialized);

        Self {
            dispatcher: Dispatcher::new(registry),
            state,
            lifecycle: Lifecycle::Idle,
        }
    }

    /// Register a closure for `method`. Must happen before the server runs;
    /// the last registration for a method wins.
    #[inline]
    pub fn register_handler<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<&Value>, Option<&Value>) -> HandlerResult + Send + Sync + 'static,
    {
        self.dispatcher.registry_mut().register_fn(method, handler);
    }

    /// Register any [`Handler`] implementation for `method`
    #[inline]
    pub fn register<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: Handler + 'static,
    {
        self.dispatcher.registry_mut().register(method, handler);
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[inline]
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Serve on the process's stdin/stdout until EOF or Ctrl-C
    #[inline]
    pub async fn serve_stdio(&mut self) -> ShutdownReason {
        info!("Starting MCP server with stdio transport");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout, interrupt()).await
    }

    /// Run the event loop over `input`/`output` until the input ends or
    /// `shutdown` resolves. Shutdown is only observed between messages.
    #[inline]
    pub async fn serve<R, W, S>(&mut self, input: R, output: W, shutdown: S) -> ShutdownReason
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        info!("Starting MCP server event loop");
        self.state.running = true;
        self.lifecycle = Lifecycle::Running;

        let mut reader = LineReader::new(input);
        let mut writer = ResponseWriter::new(output);
        tokio::pin!(shutdown);

        let reason = loop {
            let line = tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Received interrupt, shutting down");
                    break ShutdownReason::Interrupted;
                }
                line = reader.read_line() => line,
            };

            let Some(line) = line else {
                info!("EOF reached on input, shutting down");
                break ShutdownReason::EndOfStream;
            };

            let iteration = AssertUnwindSafe(self.process_line(&line, &mut writer))
                .catch_unwind()
                .await;
            if let Err(payload) = iteration {
                error!(
                    "Unexpected error in the event loop: {}",
                    panic_message(payload.as_ref())
                );
                break ShutdownReason::Fault;
            }
        };

        self.lifecycle = Lifecycle::ShuttingDown;
        self.cleanup();
        reason
    }

    async fn process_line<W>(&self, line: &str, writer: &mut ResponseWriter<W>)
    where
        W: AsyncWrite + Unpin,
    {
        let Ok(message) = parse_message(line) else {
            return;
        };

        if let Some(response) = self.dispatcher.dispatch(&message) {
            writer.write(&response).await;
        }

        writer.flush().await;
    }

    fn cleanup(&mut self) {
        info!("Cleaning up server resources");
        self.state.running = false;
        self.lifecycle = Lifecycle::Stopped;
    }
}

/// Resolves on Ctrl-C. Never resolves if the signal handler can't be installed.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for interrupt signal: {}", e);
        std::future::pending::<()>().await;
    }
}
