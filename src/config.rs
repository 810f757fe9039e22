use std::collections::HashMap;
use std::env;

use crate::cli::Args;

/// Runtime configuration, loaded from environment variables at startup.
///
/// Every field except the LLM API key has a default so the server works
/// out-of-the-box with just `OPENAI_API_KEY` set.
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM provider API key (`OPENAI_API_KEY`, required).
    pub api_key: String,
    /// Chat-completions endpoint, normalized to end in `/chat/completions`.
    pub api_endpoint: String,
    /// Model used for both location extraction and the agent run.
    pub model: String,
    /// TCP address to bind (default `0.0.0.0:3000`).
    pub bind_address: String,
    /// `tracing` filter string, e.g. `"info"` or `"debug,tower=warn"`.
    pub log_level: String,
    /// Serve the coming-soon page instead of the chat UI.
    pub coming_soon: bool,
    /// Gate the chat behind the jury password.
    pub password_protected: bool,
    /// Secret compared by `/api/verify-password`. `None` never matches.
    pub jury_password: Option<String>,
    /// Command that starts the MCP tool server (default `npx`).
    pub mcp_command: String,
    /// Arguments for the tool-server command (default `@brightdata/mcp`).
    pub mcp_args: Vec<String>,
    /// Credential forwarded to the tool server as `API_TOKEN`.
    pub brightdata_api_key: String,
    /// Forwarded as `WEB_UNLOCKER_ZONE` (default `mcp_unlocker`).
    pub web_unlocker_zone: String,
    /// Forwarded as `BROWSER_AUTH`.
    pub browser_auth: String,
    /// Per-tool-call timeout in seconds.
    pub tool_timeout: u64,
    /// Upper bound on tool-calling round trips per query.
    pub max_agent_steps: u32,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self, String> {
        // API key is required from the environment for security; the process
        // must not come up without it.
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| "OPENAI_API_KEY environment variable not set")?;

        // Endpoint: env var > default, with the /chat/completions suffix
        // appended when the configured value is a base URL.
        let api_endpoint = env::var("HYPERLOCAL_API_ENDPOINT")
            .ok()
            .map(|endpoint| {
                if endpoint.ends_with("/chat/completions") {
                    endpoint
                } else if endpoint.ends_with("/v1") {
                    format!("{}/chat/completions", endpoint)
                } else if endpoint.ends_with("/v1/") {
                    format!("{}chat/completions", endpoint)
                } else {
                    format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
                }
            })
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string());

        let mcp_command = expand_env_var_in_string(&env_or("HYPERLOCAL_MCP_COMMAND", "npx"));
        let mcp_args: Vec<String> = env_or("HYPERLOCAL_MCP_ARGS", "@brightdata/mcp")
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(expand_env_var_in_string)
            .collect();

        Ok(Config {
            api_key,
            api_endpoint,
            model: env_or("HYPERLOCAL_MODEL", "gpt-4o-mini"),
            bind_address: args
                .bind
                .clone()
                .unwrap_or_else(|| env_or("HYPERLOCAL_BIND", "0.0.0.0:3000")),
            log_level: if args.verbose {
                "debug".to_string()
            } else {
                env_or("HYPERLOCAL_LOG", "info")
            },
            coming_soon: env_flag("HYPERLOCAL_COMING_SOON"),
            password_protected: env_flag("HYPERLOCAL_PASSWORD_PROTECTED"),
            jury_password: env::var("JURY_PASSWORD").ok(),
            mcp_command,
            mcp_args,
            brightdata_api_key: env_or("BRIGHTDATA_API_KEY", ""),
            web_unlocker_zone: env_or("WEB_UNLOCKER_ZONE", "mcp_unlocker"),
            browser_auth: env_or("BROWSER_AUTH", ""),
            tool_timeout: parse_env("HYPERLOCAL_TOOL_TIMEOUT", 120),
            max_agent_steps: parse_env("HYPERLOCAL_MAX_AGENT_STEPS", 8),
        })
    }

    /// Environment passed to the spawned tool server: the parent environment
    /// (crucial for PATH) plus the explicit credential variables.
    pub fn mcp_env(&self) -> HashMap<String, String> {
        let mut env_vars: HashMap<String, String> = env::vars().collect();
        env_vars.insert("API_TOKEN".to_string(), self.brightdata_api_key.clone());
        env_vars.insert(
            "WEB_UNLOCKER_ZONE".to_string(),
            self.web_unlocker_zone.clone(),
        );
        env_vars.insert("BROWSER_AUTH".to_string(), self.browser_auth.clone());
        env_vars
    }
}

/// Expand environment variables in a string using ${VAR_NAME} syntax.
/// Unknown variables are left as-is.
pub fn expand_env_var_in_string(value: &str) -> String {
    let mut result = value.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        let replacement = env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name));
        result = result.replace(&cap[0], &replacement);
    }

    result
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
