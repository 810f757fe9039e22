use std::collections::HashMap;
use std::time::Instant;

use serde_json::json;
use tokio::time::Duration;

use hyperlocal::error::HyperlocalError;
use hyperlocal::mcp::{McpClient, McpToolCall};

// Line-oriented JSON-RPC stub spoken over stdio, with a pluggable arm for
// `tools/call`. Request ids are deterministic: initialize is 1, tools/list
// is 2, the first tools/call is 3.
const STUB_SERVER: &str = r#"while IFS= read -r line; do
  case "$line" in
    *'"method":"initialize"'*) echo '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","serverInfo":{"name":"stub","version":"0.0"},"capabilities":{"tools":{}}}}' ;;
    *'"method":"tools/list"'*) echo '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"lookup","description":"","inputSchema":{"type":"object","properties":{"query":{"type":"string"}},"required":["query"]}}]}}' ;;
    *'"method":"tools/call"'*) __CALL_ARM__ ;;
  esac
done"#;

const ANSWER_ARM: &str = r#"echo '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"all clear"}],"isError":false}}'"#;

fn stub_args(call_arm: &str) -> Vec<String> {
    vec!["-c".to_string(), STUB_SERVER.replace("__CALL_ARM__", call_arm)]
}

async fn connect_stub(client: &McpClient, call_arm: &str) {
    client
        .connect("sh", &stub_args(call_arm), HashMap::new())
        .await
        .expect("stub server should connect");
}

#[tokio::test]
async fn test_connect_discovers_tools() {
    let client = McpClient::new();
    connect_stub(&client, ANSWER_ARM).await;

    assert!(client.is_connected().await);
    let tools = client.list_tools().await;
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "lookup");
}

#[tokio::test]
async fn test_call_tool_round_trip() {
    let client = McpClient::new();
    connect_stub(&client, ANSWER_ARM).await;

    let call = McpToolCall {
        name: "lookup".to_string(),
        arguments: json!({ "query": "road closures" }),
    };
    let result = client.call_tool(&call, 5).await.unwrap();
    assert_eq!(result.text(), "all clear");
    assert_ne!(result.is_error, Some(true));
}

#[tokio::test]
async fn test_call_tool_rejects_invalid_arguments() {
    let client = McpClient::new();
    connect_stub(&client, ANSWER_ARM).await;

    // Missing the required "query" property; must fail before reaching the
    // server.
    let call = McpToolCall {
        name: "lookup".to_string(),
        arguments: json!({}),
    };
    let err = client.call_tool(&call, 5).await.unwrap_err();
    assert!(err.to_string().contains("validation failed"));
}

#[tokio::test]
async fn test_call_tool_unknown_tool() {
    let client = McpClient::new();
    connect_stub(&client, ANSWER_ARM).await;

    let call = McpToolCall {
        name: "nope".to_string(),
        arguments: json!({}),
    };
    let err = client.call_tool(&call, 5).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_call_tool_timeout_fires_and_kills_server() {
    let client = McpClient::new();
    // The ":" arm swallows tools/call and never answers.
    connect_stub(&client, ":").await;

    let call = McpToolCall {
        name: "lookup".to_string(),
        arguments: json!({ "query": "anything" }),
    };

    let start = Instant::now();
    let err = client.call_tool(&call, 1).await.unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, HyperlocalError::Timeout), "got {:?}", err);
    assert!(
        elapsed < Duration::from_secs(3),
        "timeout took {:?} to fire",
        elapsed
    );
    // The pipe is desynchronized; the server must be gone.
    assert!(!client.is_connected().await);

    // A fresh connect recovers with a working server.
    connect_stub(&client, ANSWER_ARM).await;
    let result = client.call_tool(&call, 5).await.unwrap();
    assert_eq!(result.text(), "all clear");
}
