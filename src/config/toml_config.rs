use crate::config::settings::ProxySettings;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub proxy: ProxySection,
    #[serde(default)]
    pub lambda_at_edge: LambdaAtEdgeSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxySection {
    pub listen: Option<String>,
    pub origin: Option<String>,
    pub include_body: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LambdaAtEdgeSection {
    pub endpoint: Option<String>,
    pub viewer_request: Option<String>,
    pub viewer_response: Option<String>,
    pub invoke_timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay every value present in the file onto `settings`.
    pub fn apply_to(&self, settings: &mut ProxySettings) {
        if let Some(listen) = &self.proxy.listen {
            settings.listen = listen.clone();
        }
        if let Some(origin) = &self.proxy.origin {
            settings.origin = origin.clone();
        }
        if let Some(include_body) = self.proxy.include_body {
            settings.include_body = include_body;
        }
        if let Some(endpoint) = &self.lambda_at_edge.endpoint {
            settings.lambda_endpoint = endpoint.clone();
        }
        if let Some(function) = &self.lambda_at_edge.viewer_request {
            settings.viewer_request = Some(function.clone());
        }
        if let Some(function) = &self.lambda_at_edge.viewer_response {
            settings.viewer_response = Some(function.clone());
        }
        if let Some(timeout) = self.lambda_at_edge.invoke_timeout_seconds {
            settings.invoke_timeout_seconds = timeout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EdgeError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[proxy]
listen = "0.0.0.0:9000"
origin = "http://api:3000"
include_body = false

[lambda_at_edge]
endpoint = "http://lambda:3001"
viewer_request = "modheader"
invoke_timeout_seconds = 3
"#
        )
        .unwrap();

        let config = TomlConfig::from_file(file.path()).unwrap();
        let mut settings = ProxySettings::default();
        config.apply_to(&mut settings);

        assert_eq!(settings.listen, "0.0.0.0:9000");
        assert_eq!(settings.origin, "http://api:3000");
        assert!(!settings.include_body);
        assert_eq!(settings.lambda_endpoint, "http://lambda:3001");
        assert_eq!(settings.viewer_request.as_deref(), Some("modheader"));
        assert_eq!(settings.viewer_response, None);
        assert_eq!(settings.invoke_timeout_seconds, 3);
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        let mut settings = ProxySettings::default();
        config.apply_to(&mut settings);
        assert_eq!(settings, ProxySettings::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = TomlConfig::from_toml_str("[proxy\nlisten = 1").unwrap_err();
        assert!(matches!(err, EdgeError::TomlError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = TomlConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, EdgeError::IoError(_)));
    }
}
