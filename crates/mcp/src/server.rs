// MCP request handling and the newline-delimited JSON-RPC transport

use crate::protocol::*;
use anyhow::Result;
use futures::StreamExt;
use serde_json::Value;
use smartlead_core::{DispatchEnvelope, DispatchRouter};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

/// Longest request line accepted on a stream transport
pub const MAX_LINE_LENGTH: usize = 8 * 1024 * 1024;

pub struct McpServer {
    router: Arc<DispatchRouter>,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(router: Arc<DispatchRouter>, info: ServerInfo) -> Self {
        Self { router, info }
    }

    pub fn router(&self) -> &Arc<DispatchRouter> {
        &self.router
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Handle one raw message. `None` means nothing should be sent back.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "Unparseable JSON-RPC message");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(_) => Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request())),
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            // Notifications never get a response
            debug!(method = %request.method, "Notification received");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => self.list_tools(id).await,
            "tools/call" => self.call_tool(id, request.params).await,
            other => {
                debug!(method = %other, "Unsupported method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(other))
            }
        };
        Some(response)
    }

    fn initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = params.and_then(|p| serde_json::from_value::<InitializeParams>(p).ok());
        match params.as_ref().and_then(|p| p.client_info.as_ref()) {
            Some(client) => info!(client = %client.name, version = %client.version, "MCP client connected"),
            None => info!("MCP client connected"),
        }

        JsonRpcResponse::success(
            id,
            InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities {
                    tools: ToolsCapability {
                        list_changed: false,
                    },
                },
                server_info: self.info.clone(),
            },
        )
    }

    async fn list_tools(&self, id: Value) -> JsonRpcResponse {
        let operations = self.router.list_operations().await;
        let tools = operations.iter().map(ToolSchema::from).collect();
        JsonRpcResponse::success(id, ListToolsResult { tools })
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string()))
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("tools/call requires params"),
                )
            }
        };

        let envelope = self.router.dispatch(&params.name, params.arguments).await;
        JsonRpcResponse::success(id, envelope_to_result(envelope))
    }

    /// Serve newline-delimited JSON-RPC until `reader` closes.
    ///
    /// Each request runs on its own task; responses go through a single
    /// writer so lines never interleave.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
        let (tx, mut rx) = mpsc::channel::<String>(64);

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        while let Some(frame) = lines.next().await {
            let line = match frame {
                Ok(line) => line,
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(max = MAX_LINE_LENGTH, "Dropping oversized request line");
                    send(&tx, JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error())).await;
                    continue;
                }
                Err(LinesCodecError::Io(e)) => return Err(e.into()),
            };
            if line.trim().is_empty() {
                continue;
            }

            let server = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    send(&tx, response).await;
                }
            });
        }

        // The writer drains once every in-flight request has answered
        drop(tx);
        writer_task.await??;
        info!("MCP input closed");
        Ok(())
    }

    /// Serve on this process's stdin/stdout
    pub async fn serve_stdio(self: Arc<Self>) -> Result<()> {
        info!(name = %self.info.name, version = %self.info.version, "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }
}

async fn send(tx: &mpsc::Sender<String>, response: JsonRpcResponse) {
    match serde_json::to_string(&response) {
        Ok(line) => {
            if tx.send(line).await.is_err() {
                warn!("Response dropped: output closed");
            }
        }
        Err(e) => error!(error = %e, "Failed to serialize response"),
    }
}

/// Render a dispatch outcome as MCP tool content
pub fn envelope_to_result(envelope: DispatchEnvelope) -> CallToolResult {
    if envelope.succeeded {
        let text = match envelope.payload {
            Some(Value::String(s)) => s,
            Some(payload) => serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string()),
            None => String::new(),
        };
        CallToolResult::text(text)
    } else {
        CallToolResult::error(
            envelope
                .error_message
                .unwrap_or_else(|| "tool call failed".to_string()),
        )
    }
}
