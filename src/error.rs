use std::fmt;

#[derive(Debug)]
pub enum HyperlocalError {
    ApiError {
        status: u16,
        message: String,
    },
    ConfigError(String),
    ExtractionError(String),
    McpError(String),
    AgentError(String),
    NetworkError(reqwest::Error),
    Timeout,
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    Other(String),
}

impl fmt::Display for HyperlocalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HyperlocalError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            HyperlocalError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            HyperlocalError::ExtractionError(msg) => write!(f, "Extraction error: {}", msg),
            HyperlocalError::McpError(msg) => write!(f, "MCP error: {}", msg),
            HyperlocalError::AgentError(msg) => write!(f, "Agent error: {}", msg),
            HyperlocalError::NetworkError(e) => write!(f, "Network error: {}", e),
            HyperlocalError::Timeout => write!(f, "Request timeout"),
            HyperlocalError::IoError(e) => write!(f, "IO error: {}", e),
            HyperlocalError::JsonError(e) => write!(f, "JSON error: {}", e),
            HyperlocalError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for HyperlocalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HyperlocalError::NetworkError(e) => Some(e),
            HyperlocalError::IoError(e) => Some(e),
            HyperlocalError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HyperlocalError {
    fn from(err: reqwest::Error) -> Self {
        HyperlocalError::NetworkError(err)
    }
}

impl From<std::io::Error> for HyperlocalError {
    fn from(err: std::io::Error) -> Self {
        HyperlocalError::IoError(err)
    }
}

impl From<serde_json::Error> for HyperlocalError {
    fn from(err: serde_json::Error) -> Self {
        HyperlocalError::JsonError(err)
    }
}

impl From<anyhow::Error> for HyperlocalError {
    fn from(err: anyhow::Error) -> Self {
        HyperlocalError::Other(err.to_string())
    }
}

impl From<String> for HyperlocalError {
    fn from(msg: String) -> Self {
        HyperlocalError::Other(msg)
    }
}

impl From<&str> for HyperlocalError {
    fn from(msg: &str) -> Self {
        HyperlocalError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HyperlocalError>;
