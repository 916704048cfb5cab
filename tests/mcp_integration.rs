#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

//! MCP Server Integration Tests
//!
//! Drives the complete read, parse, dispatch, write loop over in-memory
//! streams, covering the wire-level scenarios a client observes.

use mcp_stdio::config::ServerConfig;
use mcp_stdio::mcp::{HandlerError, Lifecycle, McpServer, ShutdownReason};
use serde_json::{Value, json};

/// Feed `input` to a fresh server and collect every output line
async fn run_session(input: &str) -> (McpServer, Vec<String>, ShutdownReason) {
    let mut server = McpServer::new(&ServerConfig::default());
    let (lines, reason) = run_with(&mut server, input).await;
    (server, lines, reason)
}

async fn run_with(server: &mut McpServer, input: &str) -> (Vec<String>, ShutdownReason) {
    let mut output = Vec::new();
    let reason = server
        .serve(input.as_bytes(), &mut output, std::future::pending())
        .await;

    let output = String::from_utf8(output).expect("output is utf-8");
    assert!(output.is_empty() || output.ends_with('\n'));
    (output.lines().map(str::to_string).collect(), reason)
}

/// Ping round trip
#[tokio::test]
async fn ping_scenario() {
    let (_, lines, _) = run_session("{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}\n").await;
    assert_eq!(
        lines,
        vec!["{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"status\":\"pong\"}}"]
    );
}

/// Unknown method yields -32601
#[tokio::test]
async fn unknown_method_scenario() {
    let (_, lines, _) = run_session("{\"jsonrpc\":\"2.0\",\"method\":\"foo\",\"id\":2}\n").await;
    assert_eq!(
        lines,
        vec![
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"error\":{\"code\":-32601,\"message\":\"Method not found: foo\"}}"
        ]
    );
}

/// Notifications produce no output
#[tokio::test]
async fn notification_scenario() {
    let (_, lines, _) =
        run_session("{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n").await;
    assert!(lines.is_empty());
}

/// Notifications for unknown methods are silent as well
#[tokio::test]
async fn unknown_notification_is_silent() {
    let (_, lines, _) = run_session("{\"jsonrpc\":\"2.0\",\"method\":\"nope\"}\n").await;
    assert!(lines.is_empty());
}

/// A request with a non-string method still gets exactly one response
#[tokio::test]
async fn non_string_method_gets_method_not_found() {
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"method\":5,\"id\":7}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"params\":null,\"id\":8}\n",
    );
    let (_, lines, _) = run_session(input).await;
    assert_eq!(
        lines,
        vec![
            "{\"jsonrpc\":\"2.0\",\"id\":7,\"error\":{\"code\":-32601,\"message\":\"Method not found: 5\"}}",
            "{\"jsonrpc\":\"2.0\",\"id\":8,\"result\":{\"status\":\"pong\"}}",
        ]
    );
}

/// Malformed JSON is skipped without output
#[tokio::test]
async fn malformed_json_scenario() {
    let (_, lines, reason) = run_session("not json\n").await;
    assert!(lines.is_empty());
    assert_eq!(reason, ShutdownReason::EndOfStream);
}

/// Wrong protocol version is skipped without output
#[tokio::test]
async fn wrong_version_scenario() {
    let (_, lines, _) = run_session("{\"jsonrpc\":\"1.0\",\"method\":\"ping\",\"id\":3}\n").await;
    assert!(lines.is_empty());
}

/// Closing the input stops the server cleanly
#[tokio::test]
async fn end_of_stream_scenario() {
    let (server, lines, reason) = run_session("").await;
    assert!(lines.is_empty());
    assert_eq!(reason, ShutdownReason::EndOfStream);
    assert_eq!(server.lifecycle(), Lifecycle::Stopped);
    assert!(!server.state().is_running());
}

/// Bad input never stops the loop, and responses keep arrival order
#[tokio::test]
async fn mixed_session_keeps_order() {
    let input = concat!(
        "\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"initialize\",\"params\":{},\"id\":0}\n",
        "   \n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        "[1,2,3]\n",
        "not json\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":\"second\"}\r\n",
        "{\"jsonrpc\":\"2.0\",\"id\":99,\"result\":{}}\n",
        "{\"jsonrpc\":\"2.0\"}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"missing\",\"id\":null}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"missing\",\"id\":4}\n",
    );
    let (server, lines, reason) = run_session(input).await;

    assert_eq!(reason, ShutdownReason::EndOfStream);
    assert!(server.state().is_initialized());
    assert_eq!(lines.len(), 3);

    let ids: Vec<Value> = lines
        .iter()
        .map(|line| {
            let response: Value = serde_json::from_str(line).expect("each line is json");
            assert_eq!(response["jsonrpc"], "2.0");
            response["id"].clone()
        })
        .collect();
    assert_eq!(ids, vec![json!(0), json!("second"), json!(4)]);
}

/// Undecodable bytes on one line do not end the session
#[tokio::test]
async fn invalid_utf8_line_is_skipped() {
    let mut input = b"\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":5}\n");

    let mut server = McpServer::new(&ServerConfig::default());
    let mut output = Vec::new();
    let reason = server
        .serve(input.as_slice(), &mut output, std::future::pending())
        .await;

    assert_eq!(reason, ShutdownReason::EndOfStream);
    assert_eq!(
        String::from_utf8(output).expect("output is utf-8"),
        "{\"jsonrpc\":\"2.0\",\"id\":5,\"result\":{\"status\":\"pong\"}}\n"
    );
}

/// Collaborator handlers receive params and id and can fail
#[tokio::test]
async fn collaborator_handlers() {
    let mut server = McpServer::new(&ServerConfig::default());
    server.register_handler("math/add", |params, _id| {
        let params = params.ok_or_else(|| HandlerError::failed("missing params"))?;
        let a = params["a"].as_i64().ok_or_else(|| HandlerError::failed("a must be an integer"))?;
        let b = params["b"].as_i64().ok_or_else(|| HandlerError::failed("b must be an integer"))?;
        Ok(json!(a + b))
    });

    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"method\":\"math/add\",\"params\":{\"a\":2,\"b\":3},\"id\":1}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"math/add\",\"params\":{\"a\":\"x\"},\"id\":2}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"math/add\",\"id\":3}\n",
    );
    let (lines, _) = run_with(&mut server, input).await;

    assert_eq!(
        lines,
        vec![
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":5}",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"error\":{\"code\":-32603,\"message\":\"Internal error: a must be an integer\"}}",
            "{\"jsonrpc\":\"2.0\",\"id\":3,\"error\":{\"code\":-32603,\"message\":\"Internal error: missing params\"}}",
        ]
    );
}

/// Every registered request gets exactly one response echoing its id
#[tokio::test]
async fn every_request_gets_one_response() {
    let ids = [json!(1), json!(-7), json!("abc"), json!(3.5), json!(""), json!(0)];
    let mut input = String::new();
    for id in &ids {
        input.push_str(&json!({"jsonrpc": "2.0", "method": "ping", "id": id}).to_string());
        input.push('\n');
    }

    let (_, lines, _) = run_session(&input).await;
    assert_eq!(lines.len(), ids.len());

    for (line, id) in lines.iter().zip(ids.iter()) {
        let response: Value = serde_json::from_str(line).expect("each line is json");
        assert_eq!(&response["id"], id);
        let keys: Vec<&String> = response.as_object().expect("is object").keys().collect();
        assert_eq!(keys.len(), 3);
    }
}
