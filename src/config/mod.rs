pub mod lambda;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "lambda-edge-local")]
#[command(about = "Local proxy emulating Lambda@Edge viewer events")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Address to listen on (default 127.0.0.1:8080)
    #[arg(long, env = "EDGE_LISTEN")]
    pub listen: Option<String>,

    /// Origin base URL requests are forwarded to (default http://127.0.0.1:3000)
    #[arg(long, env = "EDGE_ORIGIN")]
    pub origin: Option<String>,

    /// Lambda@Edge Endpoint URL (default http://127.0.0.1:3001)
    #[arg(long = "lambda-at-edge-endpoint", env = "LAMBDA_AT_EDGE_ENDPOINT")]
    pub lambda_endpoint: Option<String>,

    /// Lambda@Edge Viewer Request Function
    #[arg(long = "lambda-at-edge-viewer-request", env = "LAMBDA_AT_EDGE_VIEWER_REQUEST")]
    pub viewer_request: Option<String>,

    /// Lambda@Edge Viewer Response Function
    #[arg(long = "lambda-at-edge-viewer-response", env = "LAMBDA_AT_EDGE_VIEWER_RESPONSE")]
    pub viewer_response: Option<String>,

    /// Seconds to wait for a function to answer (default 15)
    #[arg(long)]
    pub invoke_timeout: Option<u64>,

    /// Do not expose the request body to viewer-request functions
    #[arg(long)]
    pub exclude_body: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
