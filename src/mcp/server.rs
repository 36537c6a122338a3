//! MCP Server implementation
//!
//! Implements the MCP server that communicates over stdio using JSON-RPC 2.0,
//! one message per line.

use super::handlers::ToolHandler;
use super::protocol::*;
use super::tools::all_tools;
use crate::Services;
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// Protocol revision this server speaks; answered regardless of the client's offer
pub const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server that handles JSON-RPC 2.0 requests over stdio
pub struct McpServer {
    server_name: String,
    tool_handler: ToolHandler,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server backed by the given upstream clients
    pub fn new(services: Arc<Services>) -> Self {
        let server_name = services.config.server_name.clone();
        Self {
            server_name,
            tool_handler: ToolHandler::new(services),
            initialized: false,
        }
    }

    /// Run the server, reading from stdin and writing to stdout
    pub async fn run(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve line-delimited JSON-RPC from `reader` until EOF
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("MCP server '{}' starting on stdio", self.server_name);

        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    error!("Failed to read line: {}", e);
                    break;
                }
            }

            let resp = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    debug!("Received: {}", line.trim_end());
                    self.handle_message(line).await
                }
                Err(e) => {
                    warn!("Discarding line that is not UTF-8: {}", e);
                    Some(JsonRpcResponse::error(
                        Value::Null,
                        JsonRpcError::parse_error(e.to_string()),
                    ))
                }
            };

            if let Some(resp) = resp {
                let json = serde_json::to_string(&resp)?;
                debug!("Sending: {}", json);
                writer.write_all(json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC message
    pub async fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(v) => v,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        // Valid JSON that is not a request object
        let request: JsonRpcRequest = match serde_json::from_value(value.clone()) {
            Ok(r) => r,
            Err(e) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };

        // Notifications carry no id and get no response
        let id = match &request.id {
            Some(id) => id.clone(),
            None => {
                self.handle_notification(&request);
                return None;
            }
        };

        let result = self.handle_request(&request).await;

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => {
                info!("Client confirmed initialization");
            }
            "notifications/cancelled" => {
                warn!("Request cancelled by client");
            }
            _ => {
                debug!("Unknown notification: {}", request.method);
            }
        }
    }

    async fn handle_request(&mut self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(&request.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(&request.params).await,
            _ => Err(JsonRpcError::method_not_found(&request.method)),
        }
    }

    fn handle_initialize(&mut self, params: &Option<Value>) -> Result<Value, JsonRpcError> {
        let params: Option<InitializeParams> = params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;

        if let Some(ref params) = params {
            info!(
                "Initializing MCP server (client protocol: {})",
                params.protocol_version
            );
            if params.protocol_version != PROTOCOL_VERSION {
                warn!(
                    "Client offered protocol {}, answering with {}",
                    params.protocol_version, PROTOCOL_VERSION
                );
            }
            if let Some(ref client) = params.client_info {
                info!(
                    "Client: {} v{}",
                    client.name,
                    client.version.as_deref().unwrap_or("unknown")
                );
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: SERVER_VERSION.to_string(),
            },
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        if !self.initialized {
            return Err(JsonRpcError::invalid_request("Server not initialized"));
        }

        let result = ToolsListResult { tools: all_tools() };
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn handle_tools_call(&self, params: &Option<Value>) -> Result<Value, JsonRpcError> {
        if !self.initialized {
            return Err(JsonRpcError::invalid_request("Server not initialized"));
        }

        let params: ToolCallParams = params
            .clone()
            .ok_or_else(|| JsonRpcError::invalid_params("params required"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
            })?;

        info!("Tool call: {}", params.name);
        debug!("Arguments: {:?}", params.arguments);

        let tool_result = match self.tool_handler.handle(&params.name, params.arguments).await {
            Ok(Value::String(text)) => ToolCallResult::success(text),
            Ok(value) => ToolCallResult::success(
                serde_json::to_string_pretty(&value)
                    .map_err(|e| JsonRpcError::internal_error(e.to_string()))?,
            ),
            Err(e) => {
                error!("Tool error: {:#}", e);
                ToolCallResult::error(format!("{:#}", e))
            }
        };

        serde_json::to_value(tool_result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::services_for;

    fn server() -> McpServer {
        McpServer::new(services_for("http://127.0.0.1:1"))
    }

    async fn initialized_server() -> McpServer {
        let mut server = server();
        server
            .handle_message(r#"{"jsonrpc":"2.0","method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{}},"id":1}"#)
            .await
            .unwrap();
        server
    }

    fn to_json(resp: JsonRpcResponse) -> Value {
        serde_json::to_value(resp).unwrap()
    }

    #[test]
    fn test_parse_tools_call_request() {
        let request = r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"get_alerts","arguments":{"state":"CA"}},"id":3}"#;
        let req: JsonRpcRequest = serde_json::from_str(request).unwrap();
        assert_eq!(req.method, "tools/call");

        let params: ToolCallParams = serde_json::from_value(req.params.unwrap()).unwrap();
        assert_eq!(params.name, "get_alerts");
    }

    #[tokio::test]
    async fn test_initialize_reports_pinned_protocol_and_name() {
        let mut server = server();
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"inspector","version":"0.1"}},"id":1}"#)
            .await
            .unwrap();
        let json = to_json(resp);
        assert_eq!(json["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(json["result"]["serverInfo"]["name"], "weather");
        assert_eq!(json["result"]["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_tools_list_requires_initialize() {
        let mut server = server();
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"tools/list","id":2}"#)
            .await
            .unwrap();
        assert_eq!(to_json(resp)["error"]["code"], error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_tools_list_after_initialize() {
        let mut server = initialized_server().await;
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"tools/list","id":2}"#)
            .await
            .unwrap();
        let json = to_json(resp);
        let tools = json["result"]["tools"].as_array().unwrap();
        assert!(tools.iter().any(|t| t["name"] == "kegg_pathway_proteins"));
        assert!(tools[0]["inputSchema"]["type"] == "object");
    }

    #[tokio::test]
    async fn test_parse_error_has_null_id() {
        let mut server = server();
        let resp = server.handle_message("{not json").await.unwrap();
        let json = to_json(resp);
        assert_eq!(json["id"], Value::Null);
        assert_eq!(json["error"]["code"], error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let mut server = server();
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = server();
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"resources/list","id":"a"}"#)
            .await
            .unwrap();
        let json = to_json(resp);
        assert_eq!(json["id"], "a");
        assert_eq!(json["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tool_failure_is_error_result() {
        let mut server = initialized_server().await;
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"missing_tool"},"id":5}"#)
            .await
            .unwrap();
        let json = to_json(resp);
        assert_eq!(json["result"]["isError"], true);
        assert_eq!(
            json["result"]["content"][0]["text"],
            "Unknown tool: missing_tool"
        );
    }

    #[tokio::test]
    async fn test_tool_json_result_is_pretty_text() {
        let mut server = initialized_server().await;
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"get_proteins_that_are_in_two_lists","arguments":{"protein_list_1":["A"],"protein_list_2":["a"]}},"id":6}"#)
            .await
            .unwrap();
        let json = to_json(resp);
        let text = json["result"]["content"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!(["a"]));
        assert!(json["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_serve_over_pipe() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"initialize","params":{"protocolVersion":"2024-11-05"},"id":1}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"ping","id":2}"#,
            "\n",
        );
        let mut output = Vec::new();
        let mut server = server();
        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1], json!({"jsonrpc": "2.0", "id": 2, "result": {}}));
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8() {
        let mut input = Vec::new();
        input.extend_from_slice(
            br#"{"jsonrpc":"2.0","method":"initialize","params":{"protocolVersion":"2024-11-05"},"id":1}"#,
        );
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","method":"ping","id":2}"#);
        input.extend_from_slice(b"\n");

        let mut output = Vec::new();
        let mut server = server();
        server.serve(input.as_slice(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1]["id"], Value::Null);
        assert_eq!(lines[1]["error"]["code"], error_codes::PARSE_ERROR);
        assert_eq!(lines[2], json!({"jsonrpc": "2.0", "id": 2, "result": {}}));
    }

    #[tokio::test]
    async fn test_non_request_json_is_invalid_request() {
        let mut server = server();

        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":7}"#)
            .await
            .unwrap();
        let json = to_json(resp);
        assert_eq!(json["id"], 7);
        assert_eq!(json["error"]["code"], error_codes::INVALID_REQUEST);

        let json = to_json(server.handle_message("[1, 2]").await.unwrap());
        assert_eq!(json["id"], Value::Null);
        assert_eq!(json["error"]["code"], error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_null_id_gets_a_response() {
        let mut server = server();
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"ping","id":null}"#)
            .await
            .unwrap();
        assert_eq!(to_json(resp), json!({"jsonrpc": "2.0", "id": null, "result": {}}));
    }
}
