use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::response::{extract_content, parse_tool_calls};
use crate::api::{LlmClient, RequestBody};
use crate::error::{HyperlocalError, Result};
use crate::mcp::{McpClient, McpToolCall};
use crate::models::{Message, ToolCall};

/// One-shot tool-calling agent execution: a system prompt, a query, and the
/// tools fetched from the MCP server, run to a final answer.
pub struct Agent<'a> {
    pub name: &'a str,
    pub llm: &'a LlmClient,
    pub mcp: &'a McpClient,
    /// Tools in chat-completions function format.
    pub tools: Vec<Value>,
    pub system_prompt: String,
    /// Upper bound on model round trips before the run is abandoned.
    pub max_steps: u32,
    /// Seconds allowed per individual tool invocation.
    pub tool_timeout: u64,
}

impl Agent<'_> {
    /// Run the agent to completion. The returned value carries the final
    /// answer under `data.result`.
    pub async fn run(&self, query: &str) -> Result<Value> {
        let mut messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(query),
        ];

        for step in 1..=self.max_steps {
            debug!(agent = self.name, step, "requesting completion");
            let request = RequestBody::new(self.llm.model(), messages.clone())
                .with_tools(self.tools.clone());
            let response = self.llm.chat(&request).await?;

            if let Some(tool_calls) = parse_tool_calls(&response)? {
                info!(agent = self.name, step, count = tool_calls.len(), "executing tools");

                let tool_calls_typed: Vec<ToolCall> = tool_calls
                    .iter()
                    .filter_map(|tc| serde_json::from_value(tc.clone()).ok())
                    .collect();

                messages.push(Message {
                    role: "assistant".to_string(),
                    content: extract_content(&response).ok().flatten(),
                    tool_calls: if tool_calls_typed.is_empty() {
                        None
                    } else {
                        Some(tool_calls_typed)
                    },
                    tool_call_id: None,
                });

                for result in self.execute_tool_calls(&tool_calls).await {
                    messages.push(result);
                }

                continue;
            }

            return match extract_content(&response)? {
                Some(content) => Ok(json!({ "data": { "result": content } })),
                None => Err(HyperlocalError::AgentError(
                    "no tool calls and no content in response".to_string(),
                )),
            };
        }

        Err(HyperlocalError::AgentError(format!(
            "no final answer after {} steps",
            self.max_steps
        )))
    }

    /// Execute every requested tool call. Malformed calls and tool failures
    /// are reported back to the model as error-text tool results rather than
    /// aborting the run. A call with no `id` cannot be answered at all — a
    /// tool message must reference an assistant `tool_calls` entry — so it
    /// is logged and skipped.
    pub async fn execute_tool_calls(&self, tool_calls: &[Value]) -> Vec<Message> {
        let mut tool_results = Vec::new();

        for tool_call in tool_calls {
            let id = match tool_call.get("id").and_then(|i| i.as_str()) {
                Some(id) => id.to_string(),
                None => {
                    warn!("tool call missing 'id' field, skipping");
                    continue;
                }
            };

            let function = tool_call.get("function");
            let name = function.and_then(|f| f.get("name")).and_then(|n| n.as_str());
            let arguments_str = function
                .and_then(|f| f.get("arguments"))
                .and_then(|a| a.as_str());

            let (name, arguments_str) = match (name, arguments_str) {
                (Some(n), Some(a)) => (n, a),
                _ => {
                    warn!(id = %id, "tool call missing function name or arguments, skipping");
                    tool_results.push(Message::tool_result(
                        id.clone(),
                        format!("Error: Tool call {} is missing required function fields", id),
                    ));
                    continue;
                }
            };

            let content = match serde_json::from_str::<Value>(arguments_str) {
                Ok(arguments) => {
                    info!(tool = name, "calling tool");
                    let call = McpToolCall {
                        name: name.to_string(),
                        arguments,
                    };
                    match self.mcp.call_tool(&call, self.tool_timeout).await {
                        Ok(result) => {
                            let text = result.text();
                            if result.is_error == Some(true) {
                                warn!(tool = name, "tool reported an error");
                                format!("Error: {}", text)
                            } else {
                                text
                            }
                        }
                        Err(e) => {
                            warn!(tool = name, error = %e, "tool call failed");
                            format!("Error: {}", e)
                        }
                    }
                }
                Err(err) => {
                    warn!(tool = name, error = %err, "failed to parse tool arguments");
                    format!(
                        "Error: failed to parse arguments for tool '{}': {}",
                        name, err
                    )
                }
            };

            tool_results.push(Message::tool_result(id, content));
        }

        tool_results
    }
}
