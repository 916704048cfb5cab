use super::*;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::{Message, Response};

fn builtins() -> (Dispatcher, Arc<AtomicBool>) {
    let initialized = Arc::new(AtomicBool::new(false));
    let mut registry = HandlerRegistry::new();
    register_builtins(&mut registry, &ServerConfig::default(), &initialized);
    (Dispatcher::new(registry), initialized)
}

#[test]
fn registers_all_builtins() {
    let (dispatcher, _) = builtins();
    assert_eq!(
        dispatcher.registry().methods(),
        vec!["initialize", "notifications/initialized", "ping"]
    );
}

#[test]
fn initialize_returns_descriptor_and_sets_flag() {
    let (dispatcher, initialized) = builtins();
    assert!(!initialized.load(Ordering::SeqCst));

    let message = Message::request(INITIALIZE, Some(json!({"anything": "goes"})), json!(0));
    let response = dispatcher.dispatch(&message).expect("request gets a response");

    assert!(initialized.load(Ordering::SeqCst));
    assert_eq!(
        response,
        Response::success(
            json!(0),
            json!({
                "protocol": { "version": "1.0.0" },
                "capabilities": { "tools": {}, "resources": {}, "prompts": {} },
                "serverInfo": { "name": "example-mcp-server", "version": "1.0.0" }
            })
        )
    );
}

#[test]
fn initialize_is_idempotent() {
    let (dispatcher, initialized) = builtins();
    let first = dispatcher.dispatch(&Message::request(INITIALIZE, None, json!(1)));
    let second = dispatcher.dispatch(&Message::request(INITIALIZE, None, json!(1)));
    assert_eq!(first, second);
    assert!(initialized.load(Ordering::SeqCst));
}

#[test]
fn initialize_reports_configured_identity() {
    let server = ServerConfig {
        name: "custom".to_string(),
        version: "9.9.9".to_string(),
        protocol_version: "2025-06-18".to_string(),
    };
    let handler = InitializeHandler::new(&server, Arc::new(AtomicBool::new(false)));
    let result = handler.handle(None, Some(&json!(1))).expect("initialize succeeds");

    assert_eq!(result["serverInfo"]["name"], "custom");
    assert_eq!(result["serverInfo"]["version"], "9.9.9");
    assert_eq!(result["protocol"]["version"], "2025-06-18");
}

#[test]
fn initialized_notification_is_silent() {
    let (dispatcher, _) = builtins();
    assert_eq!(
        dispatcher.dispatch(&Message::notification(INITIALIZED, None)),
        None
    );
}

#[test]
fn ping_answers_pong() {
    let (dispatcher, _) = builtins();
    let response = dispatcher
        .dispatch(&Message::request(PING, None, json!(1)))
        .expect("request gets a response");
    assert_eq!(
        response,
        Response::success(json!(1), json!({ "status": "pong" }))
    );
}
