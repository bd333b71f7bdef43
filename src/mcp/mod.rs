//! MCP server entrypoints for stdio and HTTP transports.

mod server;
pub(crate) mod tools;

pub use server::MyGeneServer;

/// Runs the MyGene MCP server over stdio.
///
/// # Errors
///
/// Returns an error when the tool table is inconsistent, the HTTP client
/// cannot be built, or stdio transport setup fails.
pub async fn run_stdio() -> anyhow::Result<()> {
    server::run_stdio().await
}

/// Runs the MyGene MCP server over HTTP with SSE transport.
///
/// Starts an HTTP server on `host:port` with:
/// - `GET /sse` for server-to-client messages
/// - `POST /message?sessionId=<id>` for client-to-server JSON-RPC messages
///
/// # Errors
///
/// Returns an error when TCP bind or server startup fails.
pub async fn run_http(host: &str, port: u16) -> anyhow::Result<()> {
    server::run_http(host, port).await
}
