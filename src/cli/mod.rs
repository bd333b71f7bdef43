//! Command-line surface: transport selection plus one-shot tool calls.

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::mcp::tools::{self, ToolName};
use crate::sources::mygene::MyGeneClient;

pub(crate) mod health;

#[derive(Parser, Debug)]
#[command(name = "mygene-mcp", version, about = "MyGene.info gene queries as MCP tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server over stdio
    #[command(alias = "mcp")]
    Serve,
    /// Run the MCP server over HTTP (SSE transport)
    ServeHttp {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// List available tools
    Tools,
    /// Run a single tool and print its JSON result
    Call {
        /// Tool name (see `mygene-mcp tools`)
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Print export content as-is instead of the JSON envelope
        #[arg(long)]
        raw: bool,
    },
    /// Check connectivity to MyGene.info
    Health {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn tool_table() -> String {
    let mut out = String::from("| Tool | Description |\n|------|-------------|\n");
    for tool in ToolName::ALL {
        out.push_str(&format!("| {} | {} |\n", tool.as_str(), tool.description()));
    }
    out
}

/// Extracts the rendered text of an `export_gene_list` result.
fn raw_content(payload: &Value) -> Option<&str> {
    payload.get("content").and_then(Value::as_str)
}

/// Runs a non-server command and returns the text to print.
///
/// # Errors
///
/// Returns an error for malformed `--args`, a failed tool call, or an
/// unhealthy gateway.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    match cli.command {
        Commands::Serve | Commands::ServeHttp { .. } => {
            anyhow::bail!("server commands are handled by the binary entrypoint")
        }
        Commands::Tools => Ok(tool_table()),
        Commands::Call { tool, args, raw } => {
            let args: Value = serde_json::from_str(&args)
                .map_err(|e| anyhow::anyhow!("--args must be a JSON object: {e}"))?;
            let client = MyGeneClient::new()?;
            let payload = tools::call_tool(&client, &tool, args).await;

            if let Some(kind) = payload.get("error").and_then(Value::as_str) {
                let message = payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                anyhow::bail!("{kind}: {message}");
            }
            match raw_content(&payload) {
                Some(content) if raw => Ok(content.to_string()),
                _ => Ok(crate::render::json::to_pretty(&payload)?),
            }
        }
        Commands::Health { json } => {
            let client = MyGeneClient::new()?;
            let report = health::check(&client).await;
            let text = if json {
                crate::render::json::to_pretty(&report)?
            } else {
                report.to_markdown()
            };
            if report.all_healthy() {
                Ok(text)
            } else {
                anyhow::bail!("{text}")
            }
        }
    }
}
