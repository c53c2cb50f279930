use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_function_name, validate_range, validate_socket_addr, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3000";
pub const DEFAULT_LAMBDA_ENDPOINT: &str = "http://127.0.0.1:3001";
pub const DEFAULT_INVOKE_TIMEOUT_SECONDS: u64 = 15;

/// Effective proxy configuration after defaults, file and flags are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    pub listen: String,
    pub origin: String,
    pub lambda_endpoint: String,
    pub viewer_request: Option<String>,
    pub viewer_response: Option<String>,
    pub invoke_timeout_seconds: u64,
    pub include_body: bool,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            lambda_endpoint: DEFAULT_LAMBDA_ENDPOINT.to_string(),
            viewer_request: None,
            viewer_response: None,
            invoke_timeout_seconds: DEFAULT_INVOKE_TIMEOUT_SECONDS,
            include_body: true,
        }
    }
}

#[cfg(feature = "cli")]
impl ProxySettings {
    /// Defaults, then the `--config` file, then explicit flags.
    pub fn resolve(cli: &crate::config::CliConfig) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(path) = &cli.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            crate::config::toml_config::TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        if let Some(listen) = &cli.listen {
            settings.listen = listen.clone();
        }
        if let Some(origin) = &cli.origin {
            settings.origin = origin.clone();
        }
        if let Some(endpoint) = &cli.lambda_endpoint {
            settings.lambda_endpoint = endpoint.clone();
        }
        if cli.viewer_request.is_some() {
            settings.viewer_request = cli.viewer_request.clone();
        }
        if cli.viewer_response.is_some() {
            settings.viewer_response = cli.viewer_response.clone();
        }
        if let Some(timeout) = cli.invoke_timeout {
            settings.invoke_timeout_seconds = timeout;
        }
        if cli.exclude_body {
            settings.include_body = false;
        }
        Ok(settings)
    }
}

impl ConfigProvider for ProxySettings {
    fn listen_addr(&self) -> &str {
        &self.listen
    }

    fn origin(&self) -> &str {
        &self.origin
    }

    fn lambda_endpoint(&self) -> &str {
        &self.lambda_endpoint
    }

    fn viewer_request_function(&self) -> Option<&str> {
        self.viewer_request.as_deref()
    }

    fn viewer_response_function(&self) -> Option<&str> {
        self.viewer_response.as_deref()
    }

    fn invoke_timeout(&self) -> Duration {
        Duration::from_secs(self.invoke_timeout_seconds)
    }

    fn include_body(&self) -> bool {
        self.include_body
    }
}

impl Validate for ProxySettings {
    fn validate(&self) -> Result<()> {
        validate_socket_addr("listen", &self.listen)?;
        validate_url("origin", &self.origin)?;
        validate_url("lambda_endpoint", &self.lambda_endpoint)?;
        if let Some(function) = &self.viewer_request {
            validate_function_name("viewer_request", function)?;
        }
        if let Some(function) = &self.viewer_response {
            validate_function_name("viewer_response", function)?;
        }
        validate_range("invoke_timeout_seconds", self.invoke_timeout_seconds, 1, 300)?;

        tracing::debug!("✅ Proxy configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ProxySettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.invoke_timeout(), Duration::from_secs(15));
        assert_eq!(settings.viewer_request_function(), None);
    }

    #[test]
    fn test_invalid_settings() {
        let mut settings = ProxySettings::default();
        settings.origin = "ftp://origin".to_string();
        assert!(settings.validate().is_err());

        let mut settings = ProxySettings::default();
        settings.viewer_request = Some("bad name".to_string());
        assert!(settings.validate().is_err());

        let mut settings = ProxySettings::default();
        settings.viewer_response = Some("src/lambda_at_edge.modresponse".to_string());
        assert!(settings.validate().is_ok());

        let mut settings = ProxySettings::default();
        settings.invoke_timeout_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_flags_override_file() {
        use crate::config::CliConfig;
        use clap::Parser;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[proxy]\norigin = \"http://file:3000\"\n\
             [lambda_at_edge]\nviewer_request = \"success\"\n"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "lambda-edge-local",
            "--config",
            path.as_str(),
            "--lambda-at-edge-viewer-request",
            "modheader",
            "--exclude-body",
        ]);
        let settings = ProxySettings::resolve(&cli).unwrap();

        assert_eq!(settings.origin, "http://file:3000");
        assert_eq!(settings.viewer_request.as_deref(), Some("modheader"));
        assert!(!settings.include_body);
        assert_eq!(settings.listen, DEFAULT_LISTEN);
    }
}
