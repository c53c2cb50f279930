use anyhow::Context;
use clap::Parser;
use lambda_edge_local::fixtures::invoke_api::{self, InvokeApiState};
use lambda_edge_local::fixtures::Fixture;
use lambda_edge_local::utils::logger;
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve the fixture functions behind a local Lambda Invoke API.
#[derive(Parser, Debug)]
#[command(name = "edge-fixtures-api")]
struct Args {
    /// Address to listen on
    #[arg(default_value = "127.0.0.1:3001")]
    listen: String,

    /// Seconds a function may run before it is reported as timed out
    #[arg(long, default_value_t = 5)]
    function_timeout: u64,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let state = InvokeApiState {
        function_timeout: Duration::from_secs(args.function_timeout),
    };

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    tracing::info!("🚀 Lambda Invoke API on http://{}", listener.local_addr()?);
    for name in Fixture::names() {
        tracing::debug!("  {}", name);
    }

    axum::serve(listener, invoke_api::router(state))
        .await
        .context("Invoke API server stopped")?;
    Ok(())
}
