/// MCP Server Implementation
///
/// This module contains the core MCP server implementation including:
/// - JSON-RPC 2.0 request/response structures
/// - Tool registry for managing available tools
/// - Transport-independent request dispatch
/// - HTTP server setup with Actix Web
/// - STDIO server implementation for line-based communication

use actix_web::{
    web, App, HttpServer, HttpResponse, Result,
    middleware::{Compress, Logger, DefaultHeaders},
};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::generator::RandomSource;
use crate::tools;

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC error codes used by the server.
pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// Server metadata shared by every transport.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server name as reported in MCP initialize responses
    pub server_name: String,
    /// Server version string as reported in MCP initialize responses
    pub server_version: String,
}

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// `id` is None for notifications.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure for MCP protocol.
///
/// Exactly one of `result` and `error` is present.
#[derive(Serialize, Debug)]
pub struct MCPResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

impl MCPResponse {
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Debug)]
pub struct MCPError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

/// MCP tool definition structure, serialized as-is by `tools/list`.
#[derive(Serialize, Debug, Clone)]
pub struct MCPTool {
    /// Unique tool identifier (e.g., "get_random_number")
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema defining the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Tool handler function type definition.
///
/// Handlers take the JSON arguments and resolve to the text placed in the
/// MCP content block, or an error message. The returned future must be Send
/// so STDIO and HTTP workers can drive it.
pub type ToolHandler =
    Box<dyn Fn(serde_json::Value) -> BoxFuture<'static, std::result::Result<String, String>> + Send + Sync>;

/// Registry of available MCP tools.
///
/// Tool definitions are kept in registration order for discovery; handlers
/// are looked up by name for execution.
pub struct ToolRegistry {
    pub tools: Vec<MCPTool>,
    pub handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a tool definition together with its handler.
    pub fn register(&mut self, tool: MCPTool, handler: ToolHandler) {
        let name = tool.name.clone();
        self.tools.push(tool);
        self.handlers.insert(name, handler);
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the tool registry around the process-wide random source.
///
/// Add new tool registrations here following this pattern:
/// `tools::your_tool::register(&mut registry, ...)`.
pub fn initialize_tools(source: Arc<dyn RandomSource>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    tools::random_number::register(&mut registry, source);
    Arc::new(registry)
}

/// Route one JSON-RPC request to its method handler.
///
/// Returns None for notifications, which never get a response.
pub async fn dispatch(state: &AppState, registry: &ToolRegistry, req: MCPRequest) -> Option<MCPResponse> {
    if req.id.is_none() {
        tracing::debug!(method = %req.method, "notification received");
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(state, req.id),
        "ping" => MCPResponse::success(req.id, serde_json::json!({})),
        "tools/list" => handle_tools_list(registry, req.id),
        "tools/call" => handle_tools_call(registry, req.id, req.params).await,
        _ => MCPResponse::failure(req.id, METHOD_NOT_FOUND, format!("Method not found: {}", req.method)),
    };
    Some(response)
}

/// Handle MCP initialize method.
///
/// Returns the protocol version, server capabilities, and server information.
fn handle_initialize(state: &AppState, id: Option<serde_json::Value>) -> MCPResponse {
    MCPResponse::success(
        id,
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": state.server_name,
                "version": state.server_version
            }
        }),
    )
}

fn handle_tools_list(registry: &ToolRegistry, id: Option<serde_json::Value>) -> MCPResponse {
    MCPResponse::success(
        id,
        serde_json::json!({
            "tools": registry.tools
        }),
    )
}

/// Handle MCP tools/call method.
///
/// Looks up the named tool and awaits its handler. Handler output becomes a
/// single text content block; handler errors are reported in-band with
/// `isError: true` rather than as JSON-RPC errors.
async fn handle_tools_call(
    registry: &ToolRegistry,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> MCPResponse {
    let Some(tool_params) = params else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params");
    };

    let tool_name = tool_params.get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    // Arguments default to an empty object when omitted
    let arguments = tool_params.get("arguments")
        .cloned()
        .unwrap_or(serde_json::json!({}));

    let Some(handler) = registry.handlers.get(tool_name) else {
        return MCPResponse::failure(id, METHOD_NOT_FOUND, format!("Unknown tool: {}", tool_name));
    };

    let (text, is_error) = match handler(arguments).await {
        Ok(text) => (text, false),
        Err(e) => {
            tracing::warn!(tool = tool_name, error = %e, "tool call failed");
            (format!("Error: {}", e), true)
        }
    };

    MCPResponse::success(
        id,
        serde_json::json!({
            "content": [
                {
                    "type": "text",
                    "text": text
                }
            ],
            "isError": is_error
        }),
    )
}

/// Health check endpoint handler.
async fn health(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": state.server_name
    })))
}

/// MCP JSON-RPC request handler for HTTP mode.
///
/// Counts every request for the metrics endpoint. Notifications are
/// acknowledged with 202 and an empty body.
async fn mcp_handler(
    state: web::Data<AppState>,
    registry: web::Data<Arc<ToolRegistry>>,
    counter: web::Data<AtomicU64>,
    req: web::Json<MCPRequest>,
) -> Result<HttpResponse> {
    // Relaxed is enough: the counter is only ever read for reporting.
    counter.fetch_add(1, Ordering::Relaxed);

    match dispatch(&state, &registry, req.into_inner()).await {
        Some(response) => Ok(HttpResponse::Ok().json(response)),
        None => Ok(HttpResponse::Accepted().finish()),
    }
}

/// Total number of MCP requests processed since server start.
async fn metrics_handler(counter: web::Data<AtomicU64>) -> Result<HttpResponse> {
    let count = counter.load(Ordering::Relaxed);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "requests_total": count,
        "status": "ok"
    })))
}

/// Register the HTTP routes. Expects `AppState`, `Arc<ToolRegistry>` and an
/// `AtomicU64` counter in app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// HTTP listener settings.
#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

/// Run the MCP server in HTTP mode.
///
/// The server is configured with:
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive: 30 seconds
/// - Request timeout: 30 seconds
/// - Disconnect timeout: 2 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(
    state: AppState,
    registry: Arc<ToolRegistry>,
    options: HttpOptions,
) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = format!("{}:{}", options.host, options.port);

    let app_state = web::Data::new(state);
    let tool_registry = web::Data::new(registry);
    let request_count = web::Data::new(AtomicU64::new(0));

    tracing::info!(
        name = %app_state.server_name,
        version = %app_state.server_version,
        bind = %bind_addr,
        workers = options.workers,
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(tool_registry.clone())
            .app_data(request_count.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
            )
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(routes)
    })
    .workers(options.workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Process one line of STDIO input.
///
/// Returns the serialized response line, or None when nothing should be
/// written (blank line, notification, or unparseable input without an id).
pub async fn handle_line(state: &AppState, registry: &ToolRegistry, line: &str) -> Option<String> {
    if line.trim().is_empty() {
        return None;
    }

    let response = match serde_json::from_str::<MCPRequest>(line) {
        Ok(req) => dispatch(state, registry, req).await?,
        Err(e) => {
            tracing::warn!(error = %e, "parse error");
            // Answer only if an id can be recovered from the raw JSON
            let partial = serde_json::from_str::<serde_json::Value>(line).ok()?;
            let id = partial.get("id")?.clone();
            MCPResponse::failure(Some(id), PARSE_ERROR, format!("Parse error: {}", e))
        }
    };

    match serde_json::to_string(&response) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!(error = %e, "error serializing response");
            None
        }
    }
}

/// Run the MCP server in STDIO mode.
///
/// Reads JSON-RPC requests line by line from stdin and writes one response
/// line per request to stdout, flushing after each. Requests are processed
/// one at a time. Logging goes to stderr.
pub async fn run_server_stdio(state: AppState, registry: Arc<ToolRegistry>) -> std::io::Result<()> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

    tracing::info!(
        name = %state.server_name,
        version = %state.server_version,
        "MCP server starting (STDIO mode)"
    );

    let stdin = tokio::io::stdin();
    let mut stdin = BufReader::with_capacity(8192, stdin).lines();
    let stdout = tokio::io::stdout();
    let mut stdout = BufWriter::with_capacity(8192, stdout);

    while let Some(line) = stdin.next_line().await? {
        let Some(response_json) = handle_line(&state, &registry, &line).await else {
            continue;
        };

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, STDIO server exiting");
    Ok(())
}
