//! MCP session over newline-delimited JSON-RPC 2.0.
//!
//! One JSON object per line in each direction. Resource reads that reach
//! the control plane run concurrently and may be answered out of order;
//! everything else is answered inline. Notifications (no `id`) are never
//! answered. The only capability advertised is `resources`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ResourceError;
use crate::resources::ResourceHandlers;

pub const SERVER_NAME: &str = "argocd-mcp-server";
pub const SERVER_VERSION: &str = "1.0.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

// ── JSON-RPC types ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications. An explicit `null` is still a request.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    pub fn error_with_data(
        id: Option<Value>,
        code: i32,
        message: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: Some(data),
            }),
        }
    }
}

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// ── Session ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ReadParams {
    uri: String,
}

/// Dispatches MCP methods to the resource handlers.
#[derive(Debug, Clone)]
pub struct McpSession {
    handlers: ResourceHandlers,
}

impl McpSession {
    pub fn new(handlers: ResourceHandlers) -> Self {
        Self { handlers }
    }

    pub fn handlers(&self) -> &ResourceHandlers {
        &self.handlers
    }

    /// Handle one decoded request. Returns `None` for notifications.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        cancel: &CancellationToken,
    ) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "handling request");

        let Some(id) = request.id else {
            Self::handle_notification(&request.method);
            return None;
        };
        let id = Some(id);

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("unsupported jsonrpc version: {}", request.jsonrpc),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => Self::handle_initialize(id, &request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "resources/list" => Self::handle_resources_list(id),
            "resources/read" => self.handle_resources_read(id, request.params, cancel).await,
            other => {
                warn!(method = %other, "unknown method");
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(response)
    }

    fn handle_notification(method: &str) {
        match method {
            "notifications/initialized" | "initialized" => debug!("client initialized"),
            other => debug!(method = %other, "ignoring notification"),
        }
    }

    fn handle_initialize(id: Option<Value>, params: &Value) -> JsonRpcResponse {
        let client = params
            .pointer("/clientInfo/name")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let requested = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        info!(client, requested, "MCP session initialized");

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "resources": {
                        "subscribe": false,
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    fn handle_resources_list(id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "resources": ResourceHandlers::list() }))
    }

    async fn handle_resources_read(
        &self,
        id: Option<Value>,
        params: Value,
        cancel: &CancellationToken,
    ) -> JsonRpcResponse {
        let params: ReadParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"));
            }
        };

        match self.handlers.read(&params.uri, cancel).await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
            },
            Err(err) => read_error(id, &err),
        }
    }

    /// Serve requests from `reader` until EOF or `cancel` fires.
    ///
    /// Reads that reach the control plane are spawned under a child of
    /// `cancel` and tracked by request id, so the loop keeps reading:
    /// - `notifications/cancelled` aborts the named read and its reply is
    ///   dropped.
    /// - EOF aborts every read in flight; nobody is left to answer.
    /// - `cancel` aborts every read in flight and their replies are flushed.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        mut writer: W,
        cancel: &CancellationToken,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut reads: JoinSet<(String, Option<JsonRpcResponse>)> = JoinSet::new();
        let mut in_flight: HashMap<String, CancellationToken> = HashMap::new();

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(in_flight = in_flight.len(), "session cancelled");
                    break;
                }
                Some(joined) = reads.join_next() => {
                    if let Some(response) = settle(joined, &mut in_flight, cancel) {
                        write_line(&mut writer, &response).await?;
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!(in_flight = in_flight.len(), "input closed");
                        for token in in_flight.values() {
                            token.cancel();
                        }
                        while reads.join_next().await.is_some() {}
                        return Ok(());
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let request = match decode(line) {
                        Ok(request) => request,
                        Err(response) => {
                            write_line(&mut writer, &response).await?;
                            continue;
                        }
                    };

                    if request.id.is_none() && request.method == "notifications/cancelled" {
                        cancel_named(&request.params, &in_flight);
                    } else if let Some(key) = fetch_key(&request) {
                        if in_flight.contains_key(&key) {
                            let response = JsonRpcResponse::error(
                                request.id,
                                INVALID_REQUEST,
                                format!("request id {key} is already in flight"),
                            );
                            write_line(&mut writer, &response).await?;
                            continue;
                        }
                        let token = cancel.child_token();
                        in_flight.insert(key.clone(), token.clone());
                        let session = self.clone();
                        reads.spawn(async move {
                            let response = session.handle_request(request, &token).await;
                            (key, response)
                        });
                    } else if let Some(response) =
                        self.handle_request(request, &cancel.child_token()).await
                    {
                        write_line(&mut writer, &response).await?;
                    }
                }
            }
        }

        while let Some(joined) = reads.join_next().await {
            if let Some(response) = settle(joined, &mut in_flight, cancel) {
                write_line(&mut writer, &response).await?;
            }
        }
        Ok(())
    }
}

/// In-flight key for a request that will reach the control plane.
fn fetch_key(request: &JsonRpcRequest) -> Option<String> {
    let id = request.id.as_ref()?;
    let uri = request.params.get("uri").and_then(Value::as_str)?;
    let fetches = request.jsonrpc == "2.0"
        && request.method == "resources/read"
        && ResourceHandlers::is_registered(uri);
    fetches.then(|| id.to_string())
}

fn cancel_named(params: &Value, in_flight: &HashMap<String, CancellationToken>) {
    let Some(id) = params.get("requestId") else {
        debug!("cancel notification without requestId");
        return;
    };
    let key = id.to_string();
    match in_flight.get(&key) {
        Some(token) => {
            let reason = params.get("reason").and_then(Value::as_str).unwrap_or("");
            debug!(id = %key, reason, "client cancelled request");
            token.cancel();
        }
        None => debug!(id = %key, "cancel for a request not in flight"),
    }
}

/// Retire a finished read. Replies to reads the client cancelled are dropped.
fn settle(
    joined: Result<(String, Option<JsonRpcResponse>), JoinError>,
    in_flight: &mut HashMap<String, CancellationToken>,
    session: &CancellationToken,
) -> Option<JsonRpcResponse> {
    let (key, response) = match joined {
        Ok(done) => done,
        Err(e) => {
            warn!(error = %e, "read task failed");
            return None;
        }
    };
    let token = in_flight.remove(&key);
    if token.is_some_and(|t| t.is_cancelled()) && !session.is_cancelled() {
        debug!(id = %key, "dropping reply to cancelled request");
        return None;
    }
    response
}

/// Parse one line, separating malformed JSON from well-formed non-requests.
fn decode(line: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        warn!(error = %e, "failed to parse request");
        JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"))
    })?;
    let id = value.get("id").cloned();
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid request: {e}"))
    })
}

fn read_error(id: Option<Value>, err: &ResourceError) -> JsonRpcResponse {
    match err {
        ResourceError::UnknownResource { uri } => JsonRpcResponse::error_with_data(
            id,
            INVALID_PARAMS,
            err.to_string(),
            json!({ "uri": uri }),
        ),
        _ => match err.status() {
            Some(status) => JsonRpcResponse::error_with_data(
                id,
                INTERNAL_ERROR,
                err.to_string(),
                json!({ "status": status }),
            ),
            None => JsonRpcResponse::error(id, INTERNAL_ERROR, err.to_string()),
        },
    }
}

async fn write_line<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> std::io::Result<()> {
    let mut buf = serde_json::to_vec(response).map_err(std::io::Error::other)?;
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await
}
