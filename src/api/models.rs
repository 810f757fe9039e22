use serde::Serialize;
use serde_json::{json, Value};

use crate::models::Message;

#[derive(Debug, Serialize)]
pub struct RequestBody {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

impl RequestBody {
    pub fn new(model: &str, messages: Vec<Message>) -> Self {
        RequestBody {
            model: model.to_string(),
            messages,
            stream: false,
            tools: None,
            response_format: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    /// Constrain the response to a JSON schema (structured output).
    pub fn with_json_schema(mut self, name: &str, schema: Value) -> Self {
        self.response_format = Some(json!({
            "type": "json_schema",
            "json_schema": {
                "name": name,
                "strict": true,
                "schema": schema,
            }
        }));
        self
    }
}
