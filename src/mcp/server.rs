use std::future::Future;
use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{Error as McpError, ServerHandler, ServiceExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::tools::{self, ToolName};
use crate::sources::mygene::MyGeneClient;

#[derive(Debug, Clone)]
pub struct MyGeneServer {
    client: Arc<MyGeneClient>,
}

impl MyGeneServer {
    pub fn new() -> anyhow::Result<Self> {
        tools::validate_registry()?;
        Ok(Self {
            client: Arc::new(MyGeneClient::new()?),
        })
    }

    fn tool_list() -> Vec<Tool> {
        ToolName::ALL
            .into_iter()
            .map(|tool| {
                Tool::new(
                    tool.as_str(),
                    tool.description(),
                    Arc::new(tool.input_schema()),
                )
            })
            .collect()
    }

    async fn handle_call(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        let args = request.arguments.map(Value::Object).unwrap_or(Value::Null);
        let payload = tools::call_tool(&self.client, &request.name, args).await;
        let text = crate::render::json::to_pretty(&payload)
            .map_err(|e| McpError::internal_error(format!("Failed to render result: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

impl ServerHandler for MyGeneServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mygene-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Query MyGene.info gene annotations: free-text and fielded search, batch \
                 lookups, genomic intervals, expression, pathways, GO terms, homology, \
                 diseases, variants, chemical interactions and export. \
                 Failed calls return {error, message, tool_name}."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            next_cursor: None,
            tools: Self::tool_list(),
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        self.handle_call(request)
    }
}

pub async fn run_stdio() -> anyhow::Result<()> {
    let server = MyGeneServer::new()?;
    let shutdown = CancellationToken::new();

    let cancel = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    tracing::info!(base = server.client.base(), "MyGene MCP server ready on stdio");
    let running = server
        .serve_with_ct(rmcp::transport::stdio(), shutdown)
        .await?;
    let _reason = running.waiting().await?;
    Ok(())
}

pub async fn run_http(host: &str, port: u16) -> anyhow::Result<()> {
    use rmcp::transport::sse_server::SseServer;

    let server = MyGeneServer::new()?;
    let ip: std::net::IpAddr = host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid host address: {e}"))?;
    let bind = std::net::SocketAddr::new(ip, port);

    tracing::info!("MyGene MCP HTTP server listening on http://{bind}");
    tracing::info!("  SSE endpoint:  GET  http://{bind}/sse");
    tracing::info!("  Post endpoint: POST http://{bind}/message");

    let ct = SseServer::serve(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP server: {e}"))?
        .with_service(move || server.clone());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down…");
    ct.cancel();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_list_covers_registry_in_order() {
        let tools = MyGeneServer::tool_list();
        assert_eq!(tools.len(), ToolName::ALL.len());
        assert_eq!(tools[0].name, "query_genes");
        assert_eq!(tools[26].name, "export_gene_list");
        assert!(tools.iter().all(|t| t.input_schema.contains_key("type")));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_successful_result_with_envelope() {
        let server = MyGeneServer {
            client: Arc::new(MyGeneClient::new_for_test("http://127.0.0.1:9/v3".into()).unwrap()),
        };
        let result = server
            .handle_call(CallToolRequestParam {
                name: "bogus".into(),
                arguments: None,
            })
            .await
            .unwrap();
        let text = serde_json::to_string(&result.content).unwrap();
        assert!(text.contains("ValueError"));
        assert!(text.contains("Unknown tool: bogus"));
    }
}
