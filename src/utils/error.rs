use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("Lambda invocation failed: {0}")]
    InvokeError(#[from] reqwest::Error),

    #[error("Lambda service error ({status}): {message}")]
    LambdaServiceError { status: u16, message: String },

    #[error("Lambda@Edge StatusCode: {status}")]
    UnexpectedStatusError { status: u16 },

    #[error("Lambda@Edge Error: {kind}\n{payload}\n")]
    FunctionError { kind: String, payload: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Forbidden header in function output: {name}")]
    ForbiddenHeaderError { name: String },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeaderError { name: String, reason: String },

    #[error("Invalid URI in function output: {uri}")]
    InvalidUriError { uri: String },

    #[error("Unsupported body encoding: {encoding}")]
    UnsupportedEncodingError { encoding: String },

    #[error("Invalid status in function output: {status}")]
    InvalidStatusError { status: String },

    #[error("Origin request failed: {message}")]
    OriginError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The function endpoint could not be reached or answered unexpectedly.
    Invocation,
    /// The function ran and reported an error of its own.
    Function,
    /// The function output broke one of the edge rules.
    Validation,
    Origin,
    Configuration,
}

impl EdgeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EdgeError::InvokeError(_)
            | EdgeError::LambdaServiceError { .. }
            | EdgeError::UnexpectedStatusError { .. }
            | EdgeError::SerializationError(_) => ErrorCategory::Invocation,
            EdgeError::FunctionError { .. } => ErrorCategory::Function,
            EdgeError::DecodeError(_)
            | EdgeError::ForbiddenHeaderError { .. }
            | EdgeError::InvalidHeaderError { .. }
            | EdgeError::InvalidUriError { .. }
            | EdgeError::UnsupportedEncodingError { .. }
            | EdgeError::InvalidStatusError { .. } => ErrorCategory::Validation,
            EdgeError::OriginError { .. } => ErrorCategory::Origin,
            EdgeError::IoError(_)
            | EdgeError::TomlError(_)
            | EdgeError::ConfigError { .. }
            | EdgeError::InvalidConfigValueError { .. }
            | EdgeError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Invocation => {
                "Check that the Lambda endpoint is running and the function name is correct"
            }
            ErrorCategory::Function => "Inspect the function logs for the reported error",
            ErrorCategory::Validation => {
                "The function returned a request or response CloudFront would reject"
            }
            ErrorCategory::Origin => "Check that the origin server is reachable",
            ErrorCategory::Configuration => "Review the command line flags and config file",
        }
    }
}

pub type Result<T> = std::result::Result<T, EdgeError>;
