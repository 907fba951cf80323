//! Newline-delimited JSON-RPC over stdio
//!
//! One request per input line, one response per output line. Stdout carries
//! nothing but protocol frames; all logging goes to stderr.

use crate::server::McpServer;
use crate::types::{McpError, McpRequest, McpResponse, RequestId};
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading or writing the stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be encoded
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Decode one line into a request, or the error response to send instead.
fn decode(line: &str) -> Result<McpRequest, McpResponse> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| McpResponse::error(RequestId::Null, McpError::parse_error(e)))?;

    let id = value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value::<RequestId>(id).ok())
        .unwrap_or_default();
    serde_json::from_value(value)
        .map_err(|e| McpResponse::error(id, McpError::invalid_request(e.to_string())))
}

/// Write one response as a single flushed line.
async fn write_frame<W>(writer: &mut W, response: &McpResponse) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = serde_json::to_vec(response)?;
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Serve requests from `reader` until end of input.
///
/// Requests are handled concurrently: reading continues while earlier calls
/// are in flight, and each response is written as soon as it is ready, so
/// responses may come back in a different order than the requests. Returns
/// once the input is closed and every pending request has been answered.
pub async fn serve<R, W>(server: &McpServer, reader: R, mut writer: W) -> Result<(), TransportError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut in_flight = FuturesUnordered::new();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match decode(line) {
                    Ok(request) => {
                        debug!(method = %request.method, "Received request");
                        in_flight.push(server.handle_request(request));
                    }
                    Err(response) => {
                        warn!("Rejected malformed message");
                        write_frame(&mut writer, &response).await?;
                    }
                }
            }
            Some(response) = in_flight.next(), if !in_flight.is_empty() => {
                if let Some(response) = response {
                    write_frame(&mut writer, &response).await?;
                }
            }
            else => break,
        }
    }

    Ok(())
}

/// Serve on the process's stdin and stdout.
pub async fn run_stdio(server: &McpServer) -> Result<(), TransportError> {
    info!(server = %server.info().name, "Atlassian MCP server running on stdio");
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::config::AtlassianConfig;
    use crate::clients::AtlassianClient;
    use crate::registry::default_registry;
    use crate::tools::ToolContext;
    use crate::types::ServerInfo;
    use std::time::Duration;

    fn server() -> McpServer {
        let config = AtlassianConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            email: "bot@example.com".to_string(),
            token: "secret".to_string(),
        };
        McpServer::new(
            ServerInfo {
                name: "atlassian-server".to_string(),
                version: "0.1.0".to_string(),
            },
            default_registry().unwrap(),
            ToolContext::new(AtlassianClient::new(&config, Duration::from_secs(1), false).unwrap()),
        )
    }

    async fn exchange(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        serve(&server(), BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_response_per_request() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":"two","method":"ping"}"#,
            "\n"
        );
        let responses = exchange(input).await;

        assert_eq!(responses.len(), 2);
        let init = responses.iter().find(|r| r["id"] == 1).unwrap();
        assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
        assert!(responses.iter().any(|r| r["id"] == "two"));
    }

    #[tokio::test]
    async fn test_message_without_id_gets_no_response() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#,
            "\n"
        );
        let responses = exchange(input).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_parse_error_has_null_id() {
        let responses = exchange("{not json\n").await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_request_without_method_is_invalid() {
        let responses = exchange("{\"jsonrpc\":\"2.0\",\"id\":7}\n").await;
        assert_eq!(responses[0]["id"], 7);
        assert_eq!(responses[0]["error"]["code"], -32600);
    }
}
