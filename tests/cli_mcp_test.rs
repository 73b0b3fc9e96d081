//! Integration tests for the MCP surface: manifest output and the stdio
//! serve loop.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_manifest_lists_tools() {
    let env = TestEnv::new();
    let output = env.dh().args(["mcp", "manifest"]).output().unwrap();
    assert!(output.status.success());

    let manifest: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tools = manifest["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "analyze_deck");
    assert_eq!(tools[1]["name"], "build_deck");
    assert!(tools[0]["inputSchema"]["properties"]["decklist"].is_object());
}

#[test]
fn test_serve_handles_initialize_and_tool_call() {
    let env = TestEnv::new();
    let requests = concat!(
        r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#,
        "\n",
        r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "analyze_deck", "arguments": {"decklist": "1 Sol Ring\n1 Island"}}}"#,
        "\n",
    );

    let output = env
        .dh()
        .args(["mcp", "serve"])
        .write_stdin(requests)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    // One response per request; the notification is silent.
    assert_eq!(lines.len(), 2);

    let init: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(init["id"], 1);
    assert_eq!(init["result"]["serverInfo"]["name"], "deckhand");

    let call: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(call["id"], 2);
    assert_eq!(call["result"]["isError"], false);
    let text = call["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("\"total_cards\": 2"));
}

#[test]
fn test_serve_answers_unknown_method_with_error() {
    let env = TestEnv::new();
    env.dh()
        .args(["mcp", "serve"])
        .write_stdin("{\"jsonrpc\": \"2.0\", \"id\": 9, \"method\": \"prompts/list\"}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("-32601"));
}
