//! MCP server implementation

use crate::protocol::*;
use crate::{resources, tools};
use anyhow::Result;
use regscope_core::Services;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

pub struct McpServer {
    services: Arc<Services>,
}

impl McpServer {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout
    pub async fn run(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = BufWriter::new(tokio::io::stdout());
        self.serve(reader, writer).await
    }

    /// Serve until `reader` reaches EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Unparsable request: {}", e);
                    let response =
                        JsonRpcResponse::error(None, PARSE_ERROR, &format!("Parse error: {}", e));
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            // Notifications carry no id and get no reply
            if request.id.is_none() && request.method.starts_with("notifications/") {
                tracing::debug!("Notification: {}", request.method);
                continue;
            }

            let response = self.handle_request(&request).await;
            write_response(&mut writer, &response).await?;
        }

        Ok(())
    }

    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("MCP request: {}", request.method);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            "resources/list" => self.handle_resources_list(request).await,
            "resources/read" => self.handle_resources_read(request).await,
            "prompts/list" => self.handle_prompts_list(request),
            _ => JsonRpcResponse::error(
                request.id.clone(),
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "resources": { "subscribe": false },
                "prompts": {}
            },
            "serverInfo": {
                "name": "regscope",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        JsonRpcResponse::success(request.id.clone(), result)
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = vec![
            tools::query_gen_tool_definition(),
            tools::content_search_tool_definition(),
            tools::keywords_gen_tool_definition(),
            tools::summary_tool_definition(),
            tools::search_extracts_tool_definition(),
            tools::research_tool_definition(),
        ];

        JsonRpcResponse::success(request.id.clone(), serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let name = request
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let services = &self.services;
        let result = match name {
            "query_gen" => tools::handle_query_gen(&services.catalog, arguments).await,
            "content_search" => tools::handle_content_search(&services.catalog, arguments).await,
            "keywords_gen" => tools::handle_keywords_gen(&services.catalog, arguments).await,
            "summary" => tools::handle_summary(&services.catalog, arguments).await,
            "search_extracts" => {
                tools::handle_search_extracts(services.storage.as_ref(), arguments).await
            }
            "research" => tools::handle_research(&services.workflow, arguments).await,
            _ => Err(anyhow::anyhow!("Unknown tool: {}", name)),
        };

        let tool_result = result.unwrap_or_else(|e| {
            tracing::warn!("Tool {} failed: {}", name, e);
            ToolResult::error(format!("Error: {}", e))
        });
        to_response(request.id.clone(), &tool_result)
    }

    async fn handle_resources_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        match resources::list_resources(self.services.storage.as_ref()).await {
            Ok(list) => JsonRpcResponse::success(
                request.id.clone(),
                serde_json::json!({ "resources": list }),
            ),
            Err(e) => JsonRpcResponse::error(request.id.clone(), INTERNAL_ERROR, &e.to_string()),
        }
    }

    async fn handle_resources_read(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let Some(uri) = request.params.get("uri").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, "Missing uri");
        };
        match resources::read_resource(self.services.storage.as_ref(), uri).await {
            Ok(content) => to_response(
                request.id.clone(),
                &serde_json::json!({ "contents": [content] }),
            ),
            Err(e) => JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, &e.to_string()),
        }
    }

    fn handle_prompts_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let prompts = vec![serde_json::json!({
            "name": "research",
            "title": "Regulatory Research Guide",
            "description": "How to research a banking compliance question with regscope"
        })];
        JsonRpcResponse::success(
            request.id.clone(),
            serde_json::json!({ "prompts": prompts }),
        )
    }
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, &e.to_string()),
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub async fn start_server(services: Arc<Services>) -> Result<()> {
    tracing::info!("Starting MCP server on stdio");
    let server = McpServer::new(services);
    server.run().await
}
