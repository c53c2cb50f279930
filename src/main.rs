use clap::Parser;
use lambda_edge_local::adapters::server;
use lambda_edge_local::core::ConfigProvider;
use lambda_edge_local::utils::{logger, validation::Validate};
use lambda_edge_local::{CliConfig, EdgeProxy, HttpLambdaInvoker, HttpOrigin, ProxySettings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting lambda-edge-local proxy");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match ProxySettings::resolve(&config) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let invoker = Arc::new(HttpLambdaInvoker::new(
        settings.lambda_endpoint(),
        settings.invoke_timeout(),
    )?);
    let origin = HttpOrigin::new(settings.origin(), settings.invoke_timeout())?;
    let proxy = Arc::new(EdgeProxy::new(invoker, origin, &settings));

    match settings.viewer_request_function() {
        Some(function) => tracing::info!("Viewer Request: {}", function),
        None => tracing::info!("Viewer Request: (none)"),
    }
    match settings.viewer_response_function() {
        Some(function) => tracing::info!("Viewer Response: {}", function),
        None => tracing::info!("Viewer Response: (none)"),
    }

    let listener = TcpListener::bind(settings.listen_addr()).await?;
    tracing::info!(
        "🚀 Listening on http://{} -> {}",
        listener.local_addr()?,
        settings.origin()
    );

    server::serve(listener, proxy).await?;
    Ok(())
}
