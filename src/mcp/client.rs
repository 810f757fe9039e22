use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex as StdMutex};

use jsonschema::JSONSchema;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::types::{InitializeResult, McpTool, McpToolCall, McpToolResult, ToolListResponse};
use crate::error::{HyperlocalError, Result};

// MCP protocol constants
const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const CLIENT_NAME: &str = "hyperlocal";
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client for the single external tool server, spoken to over JSON-RPC on
/// the child process's stdio.
///
/// The pipe exchange is synchronous line-oriented I/O, so every request runs
/// on the blocking pool via `spawn_blocking`; the async side only ever awaits
/// the task. That keeps the per-call `tokio::time::timeout` effective: a hung
/// server blocks a pool thread, not the runtime.
pub struct McpClient {
    server: Arc<RwLock<Option<McpServer>>>,
    tools: Arc<RwLock<HashMap<String, McpTool>>>,
}

struct McpServer {
    process: Child,
    // Shared with in-flight blocking tasks. The child handle stays out of
    // this lock so a stuck exchange can still be killed.
    io: Arc<StdMutex<ServerIo>>,
}

struct ServerIo {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl McpClient {
    pub fn new() -> Self {
        Self {
            server: Arc::new(RwLock::new(None)),
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Spawn the tool-server process and run the initialize handshake.
    /// Replaces any previously connected server.
    pub async fn connect(
        &self,
        command: &str,
        args: &[String],
        env_vars: HashMap<String, String>,
    ) -> Result<()> {
        let command = command.to_string();
        let args = args.to_vec();

        let server = task::spawn_blocking(move || -> Result<McpServer> {
            let mut cmd = Command::new(&command);
            cmd.args(&args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::null());

            // Credential values are never logged.
            for (key, value) in env_vars {
                debug!(key, "setting tool server env var");
                cmd.env(key, value);
            }

            let mut process = cmd.spawn()?;
            let stdin = process.stdin.take().ok_or_else(|| {
                HyperlocalError::McpError("Tool server has no stdin pipe".to_string())
            })?;
            let stdout = process.stdout.take().ok_or_else(|| {
                HyperlocalError::McpError("Tool server has no stdout pipe".to_string())
            })?;

            let mut io = ServerIo {
                stdin,
                stdout: BufReader::new(stdout),
                next_id: 1,
            };

            let init_params = json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "clientInfo": {
                    "name": CLIENT_NAME,
                    "version": CLIENT_VERSION
                }
            });

            let response = send_request(&mut io, "initialize", Some(init_params))?;
            let init_result: InitializeResult = serde_json::from_value(response)?;
            info!(
                server = %init_result.server_info.name,
                version = %init_result.server_info.version,
                "connected to MCP server"
            );

            send_notification(&mut io, "notifications/initialized", None)?;

            Ok(McpServer {
                process,
                io: Arc::new(StdMutex::new(io)),
            })
        })
        .await
        .map_err(|e| HyperlocalError::McpError(format!("connect task panicked: {}", e)))??;

        {
            let mut slot = self.server.write().await;
            if let Some(mut old) = slot.replace(server) {
                let _ = old.process.kill();
            }
        }

        self.discover_tools().await?;

        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.server.read().await.is_some()
    }

    /// Kill the server process and forget its tools. A subsequent
    /// `connect` starts over with a fresh process.
    pub async fn disconnect(&self) {
        let mut slot = self.server.write().await;
        if let Some(mut server) = slot.take() {
            let _ = server.process.kill();
        }
        drop(slot);
        self.tools.write().await.clear();
    }

    async fn io_handle(&self) -> Result<Arc<StdMutex<ServerIo>>> {
        let slot = self.server.read().await;
        slot.as_ref()
            .map(|server| Arc::clone(&server.io))
            .ok_or_else(|| HyperlocalError::McpError("Not connected".to_string()))
    }

    async fn discover_tools(&self) -> Result<()> {
        let io = self.io_handle().await?;
        let response = task::spawn_blocking(move || {
            let mut io = lock_io(&io)?;
            send_request(&mut io, "tools/list", None)
        })
        .await
        .map_err(|e| HyperlocalError::McpError(format!("tools/list task panicked: {}", e)))??;

        let tool_list: ToolListResponse = serde_json::from_value(response)?;

        let mut tools = self.tools.write().await;
        tools.clear();
        for tool in tool_list.tools {
            debug!(
                tool = %tool.name,
                description = tool.description.as_deref().unwrap_or(""),
                "discovered tool"
            );
            tools.insert(tool.name.clone(), tool);
        }

        Ok(())
    }

    pub async fn get_tool(&self, tool_name: &str) -> Option<McpTool> {
        let tools = self.tools.read().await;
        tools.get(tool_name).cloned()
    }

    pub async fn list_tools(&self) -> Vec<McpTool> {
        let tools = self.tools.read().await;
        tools.values().cloned().collect()
    }

    /// Invoke a tool, bounding the call with `timeout_secs`. Arguments are
    /// validated against the tool's declared input schema first.
    ///
    /// On timeout the request is abandoned mid-pipe, which desynchronizes
    /// the JSON-RPC stream, so the server is killed; the next query
    /// reconnects through `ensure_ready`.
    pub async fn call_tool(
        &self,
        tool_call: &McpToolCall,
        timeout_secs: u64,
    ) -> Result<McpToolResult> {
        if let Some(tool) = self.get_tool(&tool_call.name).await {
            if let Err(validation_errors) = validate_tool_arguments(&tool, &tool_call.arguments) {
                return Err(HyperlocalError::McpError(format!(
                    "Tool '{}' argument validation failed: {}",
                    tool_call.name, validation_errors
                )));
            }
        } else {
            return Err(HyperlocalError::McpError(format!(
                "Tool '{}' not found",
                tool_call.name
            )));
        }

        let io = self.io_handle().await?;
        let params = json!({
            "name": tool_call.name,
            "arguments": tool_call.arguments,
        });

        let exchange = task::spawn_blocking(move || -> Result<McpToolResult> {
            let mut io = lock_io(&io)?;
            let response = send_request(&mut io, "tools/call", Some(params))?;
            Ok(serde_json::from_value(response)?)
        });

        match timeout(Duration::from_secs(timeout_secs), exchange).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(HyperlocalError::McpError(format!(
                "Tool '{}' task panicked: {}",
                tool_call.name, e
            ))),
            Err(_) => {
                warn!(
                    tool = %tool_call.name,
                    timeout_secs,
                    "tool call timed out; killing tool server"
                );
                self.disconnect().await;
                Err(HyperlocalError::Timeout)
            }
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        let server = self.server.write().await.take();
        if let Some(mut server) = server {
            let _ = task::spawn_blocking(move || {
                if let Ok(mut io) = server.io.lock() {
                    let _ = send_request(&mut io, "shutdown", None);
                }
                let _ = server.process.kill();
            })
            .await;
        }
        self.tools.write().await.clear();
        Ok(())
    }
}

impl Default for McpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_io(io: &StdMutex<ServerIo>) -> Result<std::sync::MutexGuard<'_, ServerIo>> {
    io.lock()
        .map_err(|_| HyperlocalError::McpError("Tool server connection poisoned".to_string()))
}

fn send_request(io: &mut ServerIo, method: &str, params: Option<Value>) -> Result<Value> {
    let id = io.next_id;
    io.next_id += 1;

    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params.unwrap_or(json!({}))
    });

    let request_str = serde_json::to_string(&request)?;
    writeln!(io.stdin, "{}", request_str)?;
    io.stdin.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if io.stdout.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let response: Value = serde_json::from_str(&line)?;
        if response.get("id") == Some(&json!(id)) {
            if let Some(result) = response.get("result") {
                return Ok(result.clone());
            } else if let Some(error) = response.get("error") {
                return Err(HyperlocalError::McpError(error.to_string()));
            }
        }
    }

    Err(HyperlocalError::McpError(
        "No response from MCP server".to_string(),
    ))
}

fn send_notification(io: &mut ServerIo, method: &str, params: Option<Value>) -> Result<()> {
    let notification = json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params.unwrap_or(json!({}))
    });

    let notification_str = serde_json::to_string(&notification)?;
    writeln!(io.stdin, "{}", notification_str)?;
    io.stdin.flush()?;

    Ok(())
}

fn validate_tool_arguments(tool: &McpTool, arguments: &Value) -> std::result::Result<(), String> {
    let schema = match JSONSchema::compile(&tool.input_schema) {
        Ok(s) => s,
        Err(e) => return Err(format!("Invalid tool schema: {}", e)),
    };

    if let Err(errors) = schema.validate(arguments) {
        let error_messages: Vec<String> = errors
            .map(|e| format!("{}: {}", e.instance_path, e))
            .collect();
        return Err(error_messages.join("; "));
    }

    Ok(())
}
