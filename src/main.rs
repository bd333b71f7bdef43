use clap::Parser;
use tracing_subscriber::EnvFilter;

use mygene_mcp::cli::{Cli, Commands};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let served = match &cli.command {
        Commands::Serve => Some(mygene_mcp::mcp::run_stdio().await),
        Commands::ServeHttp { host, port } => Some(mygene_mcp::mcp::run_http(host, *port).await),
        _ => None,
    };

    match served {
        Some(Ok(())) => std::process::ExitCode::SUCCESS,
        Some(Err(err)) => {
            eprintln!("Error: {err}");
            std::process::ExitCode::from(1)
        }
        None => match mygene_mcp::cli::run(cli).await {
            Ok(output) => {
                println!("{output}");
                std::process::ExitCode::SUCCESS
            }
            Err(err) => {
                if let Some(gene_err) = err.downcast_ref::<mygene_mcp::error::MyGeneError>() {
                    eprintln!("Error [{}]: {gene_err}", gene_err.kind());
                } else {
                    eprintln!("Error: {err}");
                }
                std::process::ExitCode::from(1)
            }
        },
    }
}
