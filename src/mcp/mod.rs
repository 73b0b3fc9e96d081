//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides:
//! - `dh mcp serve` - Start a stdio MCP server
//! - `dh mcp manifest` - Output tool definitions
//!
//! The server speaks line-delimited JSON-RPC 2.0 over stdin/stdout: one
//! request per line, one response per line, notifications get no response.
//! Both analysis operations are exposed as MCP tools for AI agent
//! integration.

use std::io::{self, BufRead, Write};

use serde::Deserialize;
use serde_json::{json, Value};

use crate::commands::{self, CommandResult};
use crate::models::{AnalyzeInput, BuildInput};
use crate::{DataContext, Result};

/// MCP tool definitions for deckhand operations.
pub mod tools {
    use serde_json::{json, Value};

    /// Tool definition for the MCP manifest.
    pub struct ToolDef {
        pub name: &'static str,
        pub description: &'static str,
        pub input_schema: Value,
    }

    /// Get all available MCP tools.
    pub fn get_tools() -> Vec<ToolDef> {
        vec![
            ToolDef {
                name: "analyze_deck",
                description: "Analyze a Commander decklist against a category template and bracket rules",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "decklist": {
                            "type": "string",
                            "description": "Decklist text, one 'QTY Name' entry per line"
                        },
                        "commander": {"type": "string"},
                        "template": {"type": "string"},
                        "bracket": {"type": "string"}
                    },
                    "required": ["decklist"]
                }),
            },
            ToolDef {
                name: "build_deck",
                description: "Build a skeleton Commander deck for a commander, with optional recommendation autofill",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "commander": {"type": "string"},
                        "template": {"type": "string"},
                        "bracket": {"type": "string"},
                        "seed_cards": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Cards to include at one copy each"
                        },
                        "fetch_recommendations": {"type": "boolean"},
                        "autofill": {"type": "boolean"}
                    },
                    "required": ["commander"]
                }),
            },
        ]
    }

    /// Manifest document listing every tool.
    pub fn manifest_value() -> Value {
        json!({
            "tools": get_tools()
                .iter()
                .map(|t| json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                }))
                .collect::<Vec<_>>()
        })
    }
}

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct AnalyzeArgs {
    decklist: String,
    #[serde(flatten)]
    input: AnalyzeInput,
}

/// Start the MCP stdio server. Runs until stdin closes.
pub fn serve(ctx: &DataContext) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_line(ctx, &line) {
            let mut out = stdout.lock();
            serde_json::to_writer(&mut out, &response)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Output the MCP tool manifest.
pub fn manifest() {
    println!(
        "{}",
        serde_json::to_string_pretty(&tools::manifest_value()).unwrap_or_default()
    );
}

/// Handle one request line. Returns `None` for notifications (no id) and
/// unparseable notifications; malformed requests get a parse error with a
/// null id per JSON-RPC 2.0.
fn handle_line(ctx: &DataContext, line: &str) -> Option<Value> {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            return Some(error_response(
                Value::Null,
                -32700,
                &format!("parse error: {}", e),
            ))
        }
    };

    // Notifications get processed but never answered.
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "initialize" => json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {"tools": {}},
            "serverInfo": {
                "name": "deckhand",
                "version": env!("CARGO_PKG_VERSION"),
            }
        }),
        "ping" => json!({}),
        "tools/list" => tools::manifest_value(),
        "tools/call" => match call_tool(ctx, &request.params) {
            Ok(result) => result,
            Err(message) => return Some(error_response(id, -32602, &message)),
        },
        other => return Some(error_response(id, -32601, &format!("method not found: {}", other))),
    };

    Some(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message}
    })
}

/// Dispatch a tools/call request. A tool-level failure is a successful
/// JSON-RPC response with `isError` set, per MCP.
fn call_tool(ctx: &DataContext, params: &Value) -> std::result::Result<Value, String> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or("missing tool name")?;
    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    let outcome = match name {
        "analyze_deck" => {
            let args: AnalyzeArgs = serde_json::from_value(arguments)
                .map_err(|e| format!("invalid analyze_deck arguments: {}", e))?;
            let deck = crate::decklist::parse(&args.decklist);
            crate::analyzer::analyze(ctx, &args.input, &deck).map(|a| a.to_json())
        }
        "build_deck" => {
            let input: BuildInput = serde_json::from_value(arguments)
                .map_err(|e| format!("invalid build_deck arguments: {}", e))?;
            commands::build(ctx, &input).map(|r| r.to_json())
        }
        other => return Err(format!("unknown tool: {}", other)),
    };

    Ok(match outcome {
        Ok(text) => json!({
            "content": [{"type": "text", "text": text}],
            "isError": false
        }),
        Err(e) => json!({
            "content": [{"type": "text", "text": e.to_string()}],
            "isError": true
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::embedded_context;

    #[test]
    fn test_initialize_reports_tool_capability() {
        let (_dir, ctx) = embedded_context();
        let response = handle_line(
            &ctx,
            r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#,
        )
        .unwrap();
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["serverInfo"]["name"], "deckhand");
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[test]
    fn test_notification_gets_no_response() {
        let (_dir, ctx) = embedded_context();
        let response = handle_line(
            &ctx,
            r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#,
        );
        assert!(response.is_none());
    }

    #[test]
    fn test_tools_list_names_both_tools() {
        let (_dir, ctx) = embedded_context();
        let response =
            handle_line(&ctx, r#"{"jsonrpc": "2.0", "id": 2, "method": "tools/list"}"#).unwrap();
        let tools = response["result"]["tools"].as_array().unwrap();
        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["analyze_deck", "build_deck"]);
        assert_eq!(tools[0]["inputSchema"]["required"][0], "decklist");
    }

    #[test]
    fn test_unknown_method_is_error() {
        let (_dir, ctx) = embedded_context();
        let response = handle_line(
            &ctx,
            r#"{"jsonrpc": "2.0", "id": 3, "method": "resources/list"}"#,
        )
        .unwrap();
        assert_eq!(response["error"]["code"], -32601);
    }

    #[test]
    fn test_parse_error_answers_with_null_id() {
        let (_dir, ctx) = embedded_context();
        let response = handle_line(&ctx, "not json").unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert!(response["id"].is_null());
    }

    #[test]
    fn test_analyze_deck_call_returns_analysis_text() {
        let (_dir, ctx) = embedded_context();
        let request = r#"{"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"name": "analyze_deck", "arguments": {"decklist": "1 Sol Ring\n1 Island", "template": "bracket3"}}}"#;
        let response = handle_line(&ctx, request).unwrap();
        assert_eq!(response["result"]["isError"], false);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let analysis: Value = serde_json::from_str(text).unwrap();
        assert_eq!(analysis["template"], "bracket3");
        assert_eq!(analysis["total_cards"], 2);
    }

    #[test]
    fn test_build_deck_call_without_fetch() {
        let (_dir, ctx) = embedded_context();
        let request = r#"{"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {"name": "build_deck", "arguments": {"commander": "The Scarab God", "template": "bracket3"}}}"#;
        let response = handle_line(&ctx, request).unwrap();
        assert_eq!(response["result"]["isError"], false);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let result: Value = serde_json::from_str(text).unwrap();
        assert_eq!(result["commander"], "The Scarab God");
        assert_eq!(result["color_identity"], serde_json::json!(["U", "B"]));
    }

    #[test]
    fn test_build_deck_unknown_commander_is_tool_error() {
        let (_dir, ctx) = embedded_context();
        let request = r#"{"jsonrpc": "2.0", "id": 6, "method": "tools/call", "params": {"name": "build_deck", "arguments": {"commander": "Nobody"}}}"#;
        let response = handle_line(&ctx, request).unwrap();
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Commander not found"));
    }

    #[test]
    fn test_missing_tool_name_is_invalid_params() {
        let (_dir, ctx) = embedded_context();
        let request = r#"{"jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {}}"#;
        let response = handle_line(&ctx, request).unwrap();
        assert_eq!(response["error"]["code"], -32602);
    }
}
