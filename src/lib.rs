pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod fixtures;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{lambda_client::HttpLambdaInvoker, origin::HttpOrigin};
pub use config::{lambda::FixtureRuntimeConfig, settings::ProxySettings};
pub use core::proxy::EdgeProxy;
pub use utils::error::{EdgeError, Result};
