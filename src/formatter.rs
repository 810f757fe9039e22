use serde_json::Value;
use tracing::warn;

/// Message shown when the agent result matches none of the known shapes.
pub const UNRECOGNIZED_FORMAT: &str = "AI response format is not recognized.";

/// Normalize an agent-run result into a single display string.
///
/// Accepted shapes, in order: `{"data": "..."}`, `{"data": {"result": "..."}}`,
/// `{"data": <anything else>}` (stringified), a bare string. Everything else
/// falls back to a fixed message. Never fails.
pub fn format_agent_response(agent_response: &Value) -> String {
    if let Some(data) = agent_response.get("data") {
        if let Some(text) = data.as_str() {
            return text.to_string();
        }

        if let Some(result) = data.get("result").and_then(|r| r.as_str()) {
            return result.to_string();
        }

        warn!(%data, "unexpected result data structure");
        return data.to_string();
    }

    if let Some(text) = agent_response.as_str() {
        return text.to_string();
    }

    warn!(%agent_response, "unexpected agent response structure");
    UNRECOGNIZED_FORMAT.to_string()
}
