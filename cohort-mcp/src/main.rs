//! Cohort MCP Server
//!
//! JSON-RPC 2.0 over stdio, one message per line.
//!
//! Tools:
//! - list_variables: Numeric and grouping fields
//! - list_patients: Patient ids and names
//! - analyze: Descriptive, t-test, ANOVA, correlation and regression presets
//! - normality: K-S and S-W tests for every variable with data
//! - histogram: Equal-width histogram of one field
//! - stats: Call a statistics function directly
//! - list_functions: List available functions
//! - help: Get documentation for functions

mod config;
mod tools;

use cohort::{Cohort, JsonFileSource, PatientSource};
use config::ServerConfig;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "cohort";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    jsonrpc: String,
    /// `None` only when the key is absent; `"id": null` is `Some(Null)`
    #[serde(default, deserialize_with = "present_id")]
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

fn present_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JsonValue>, D::Error> {
    JsonValue::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

impl McpResponse {
    fn from_result(id: Option<JsonValue>, result: Result<JsonValue, McpError>) -> Self {
        match result {
            Ok(r) => Self { jsonrpc: "2.0".to_string(), id, result: Some(r), error: None },
            Err(e) => Self { jsonrpc: "2.0".to_string(), id, result: None, error: Some(e) },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }
}

/// Request dispatcher over one patient source
struct Server {
    cohort: Cohort,
    source: Box<dyn PatientSource>,
}

impl Server {
    fn new(cohort: Cohort, source: Box<dyn PatientSource>) -> Self {
        Self { cohort, source }
    }

    fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Cohort::with_stats_library().with_default_bins(config.histogram_bins),
            Box::new(JsonFileSource::new(config.data_path.clone())),
        )
    }

    /// Handle one input line. Notifications produce no response.
    fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let request: McpRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("error parsing request: {}", e);
                return Some(McpResponse::from_result(
                    None,
                    Err(McpError::new(PARSE_ERROR, format!("Parse error: {}", e))),
                ));
            }
        };

        tracing::debug!(method = %request.method, "processing");
        let response = self.handle_request(&request);

        if request.id.is_none() {
            tracing::debug!(method = %request.method, "notification processed");
            return None;
        }
        Some(response)
    }

    fn handle_request(&self, request: &McpRequest) -> McpResponse {
        if request.jsonrpc != "2.0" {
            return McpResponse::from_result(
                request.id.clone(),
                Err(McpError::new(INVALID_REQUEST, format!("Unsupported jsonrpc version: {}", request.jsonrpc))),
            );
        }

        let result = match request.method.as_str() {
            // Lifecycle
            "initialize" => handle_initialize(&request.params),
            "initialized" | "notifications/initialized" => Ok(json!({})),
            "ping" => Ok(json!({})),

            // Tools
            "tools/list" => Ok(tools::tool_definitions()),
            "tools/call" => self.handle_tool_call(&request.params),

            _ => Err(McpError::new(METHOD_NOT_FOUND, format!("Method not found: {}", request.method))),
        };

        McpResponse::from_result(request.id.clone(), result)
    }

    fn handle_tool_call(&self, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
        let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;
        let name = params
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;
        let empty = json!({});
        let arguments = params.get("arguments").unwrap_or(&empty);

        tracing::info!(tool = name, "tool call");
        tools::call_tool(&self.cohort, self.source.as_ref(), name, arguments)
    }
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params
        .as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Echo the client's protocol version
    let client_protocol = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    tracing::info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Statistics over a patient registry"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Call list_variables to see field keys. analyze runs a preset (descriptive, t_test, anova, correlation, regression); pass patient_ids to restrict the selection. normality screens every variable. Show the returned markdown tables to the user as received."
    }))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        version = SERVER_VERSION,
        protocol = PROTOCOL_VERSION,
        data_path = %config.data_path.display(),
        bins = config.histogram_bins,
        "cohort MCP server started"
    );

    let server = Server::from_config(&config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("client disconnected (EOF)");
                break;
            }
            Err(e) => {
                tracing::error!("error reading input: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(response) = server.handle_line(line) else {
            continue;
        };

        let mut payload = match serde_json::to_string(&response) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("error encoding response: {}", e);
                continue;
            }
        };
        payload.push('\n');

        if let Err(e) = stdout.write_all(payload.as_bytes()).await {
            tracing::error!("error writing response: {}", e);
            break;
        }
        if let Err(e) = stdout.flush().await {
            tracing::error!("error flushing stdout: {}", e);
            break;
        }
    }

    tracing::info!("server shutting down");
}
