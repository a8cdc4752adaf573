//! promptopt HTTP server - optimize system prompts over a REST endpoint.

mod routes;

use anyhow::{Context, Result};
use clap::Parser;
use promptopt_core::{GatewayConfig, OptimizerConfig};
use routes::AppState;
use std::net::SocketAddr;
use std::sync::Arc;

/// HTTP endpoint for the prompt optimizer
#[derive(Parser, Debug)]
#[command(name = "promptopt-server")]
#[command(about = "HTTP endpoint for the prompt optimizer", long_about = None)]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Model identifier to optimize with
    #[arg(long, default_value = promptopt_core::DEFAULT_MODEL)]
    model: String,

    /// OpenAI API key (can also use OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let state = Arc::new(AppState {
        api_key: args.api_key,
        gateway_config: GatewayConfig::default().with_model(args.model),
        optimizer_defaults: OptimizerConfig::default(),
    });

    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    log::info!("promptopt server listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
