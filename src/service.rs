use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::agent::Agent;
use crate::api::LlmClient;
use crate::config::Config;
use crate::error::Result;
use crate::formatter::format_agent_response;
use crate::location::extract_location_info;
use crate::mcp::{tools::format_tools_for_llm, McpClient, McpTool};
use crate::prompt::build_disruption_prompt;

/// Degraded-service reply used when the tool server came up without tools.
pub const DEGRADED_MESSAGE: &str =
    "We couldn't process your request at this time. Please try again later.";

/// Generic failure surfaced for any error inside the query pipeline.
pub const PROCESS_FAILURE: &str = "Failed to process query.";

const NOT_READY: &str = "Not initialized and initialization failed.";

/// Outcome of one query. `Error` is a payload for the UI to render as a chat
/// bubble, not an HTTP failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answer(String),
    Error(String),
}

/// Seam between the HTTP layer and the orchestrator, so handlers can be
/// tested against a stub.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Bring the service up if it is not already. Never fails; returns
    /// whether the service is usable.
    async fn ensure_ready(&self) -> bool;

    async fn process_query(&self, message: &str, session_id: Option<&str>) -> QueryOutcome;
}

struct ServiceState {
    ready: bool,
    tools: Vec<McpTool>,
}

/// Orchestrates the per-query pipeline: location extraction, prompt
/// construction, the agent run against the MCP tools, and response
/// formatting. Constructed once at startup and shared behind an `Arc`.
pub struct DisruptionService {
    config: Arc<Config>,
    llm: LlmClient,
    mcp: McpClient,
    // Readiness flag and tool list, written only during initialization.
    // The mutex serializes concurrent first-time queries.
    state: Mutex<ServiceState>,
}

impl DisruptionService {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let llm = LlmClient::new(&config.api_key, &config.api_endpoint, &config.model)?;

        Ok(DisruptionService {
            config,
            llm,
            mcp: McpClient::new(),
            state: Mutex::new(ServiceState {
                ready: false,
                tools: Vec::new(),
            }),
        })
    }

    async fn run_pipeline(&self, message: &str, session_id: Option<&str>) -> Result<String> {
        let location = extract_location_info(&self.llm, message).await?;
        let system_prompt = build_disruption_prompt(&location, session_id);

        let tools = {
            let state = self.state.lock().await;
            format_tools_for_llm(&state.tools)
        };

        let agent = Agent {
            name: "ScrapingAgent",
            llm: &self.llm,
            mcp: &self.mcp,
            tools,
            system_prompt,
            max_steps: self.config.max_agent_steps,
            tool_timeout: self.config.tool_timeout,
        };

        let agent_response = agent.run(message).await?;
        Ok(format_agent_response(&agent_response))
    }
}

#[async_trait]
impl QueryService for DisruptionService {
    async fn ensure_ready(&self) -> bool {
        let mut state = self.state.lock().await;
        // A timed-out tool call kills the server process; treat that the
        // same as never having initialized.
        if state.ready && self.mcp.is_connected().await {
            return true;
        }

        info!("initializing and connecting to MCP server");
        match self
            .mcp
            .connect(
                &self.config.mcp_command,
                &self.config.mcp_args,
                self.config.mcp_env(),
            )
            .await
        {
            Ok(()) => {
                state.tools = self.mcp.list_tools().await;
                state.ready = true;
                info!(count = state.tools.len(), "fetched tools from MCP server");
                true
            }
            Err(e) => {
                // Initialization failures degrade the service; they are
                // logged but never propagated. The next request retries.
                error!(error = %e, "failed to initialize or fetch MCP tools");
                state.tools.clear();
                state.ready = false;
                false
            }
        }
    }

    async fn process_query(&self, message: &str, session_id: Option<&str>) -> QueryOutcome {
        if !self.ensure_ready().await {
            return QueryOutcome::Error(NOT_READY.to_string());
        }

        let has_tools = {
            let state = self.state.lock().await;
            !state.tools.is_empty()
        };
        if !has_tools {
            warn!("no MCP tools available");
            return QueryOutcome::Answer(DEGRADED_MESSAGE.to_string());
        }

        match self.run_pipeline(message, session_id).await {
            Ok(content) => QueryOutcome::Answer(content),
            Err(e) => {
                error!(error = %e, "error processing query");
                QueryOutcome::Error(PROCESS_FAILURE.to_string())
            }
        }
    }
}
