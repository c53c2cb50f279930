//! Test fixture functions for edge and API-gateway integrations.
//!
//! Each fixture is a stateless handler that receives a synthetic event and
//! returns a request, a response, or a deliberate failure. Fixtures are
//! addressed as `<module>.<function>`; a bare function name resolves in
//! `lambda_at_edge`, and any path in front (`src/lambda_at_edge.modheader`)
//! is ignored so Lambda `_HANDLER` values can be used directly.

pub mod api_gateway;
pub mod invoke_api;
pub mod lambda_at_edge;
pub mod origin_rewrite;

use serde_json::{json, Value};
use thiserror::Error;

pub const DEFAULT_MODULE: &str = "lambda_at_edge";

#[derive(Error, Debug)]
pub enum FixtureError {
    /// A bare string was thrown.
    #[error("{0}")]
    Thrown(String),

    #[error("{0}")]
    Exception(String),

    #[error("Cannot read event: {0}")]
    InvalidEvent(String),

    #[error("Handler '{0}' not found")]
    UnknownHandler(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FixtureError {
    pub fn error_type(&self) -> &'static str {
        match self {
            FixtureError::Thrown(_) => "string",
            FixtureError::Exception(_) => "Error",
            FixtureError::InvalidEvent(_) => "TypeError",
            FixtureError::UnknownHandler(_) => "Runtime.HandlerNotFound",
            FixtureError::SerializationError(_) => "Runtime.MarshalError",
        }
    }

    /// Error document in the shape Lambda runtimes report.
    pub fn to_payload(&self) -> Value {
        json!({
            "errorType": self.error_type(),
            "errorMessage": self.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    ApiGatewayProxy,
    ApiGatewayHello,
    EdgeFailure,
    EdgeModHeader,
    EdgeModBody,
    EdgeRespond,
    EdgeModUri,
    EdgeSuccess,
    EdgeProbe,
    EdgeModResponse,
    OriginModHeader,
    OriginModBody,
    OriginRespond,
    OriginModUri,
}

const FIXTURES: &[(&str, &str, Fixture)] = &[
    ("api_gateway", "proxy", Fixture::ApiGatewayProxy),
    ("api_gateway", "hello", Fixture::ApiGatewayHello),
    ("lambda_at_edge", "failure", Fixture::EdgeFailure),
    ("lambda_at_edge", "modheader", Fixture::EdgeModHeader),
    ("lambda_at_edge", "modbody", Fixture::EdgeModBody),
    ("lambda_at_edge", "respond", Fixture::EdgeRespond),
    ("lambda_at_edge", "moduri", Fixture::EdgeModUri),
    ("lambda_at_edge", "success", Fixture::EdgeSuccess),
    ("lambda_at_edge", "probe", Fixture::EdgeProbe),
    ("lambda_at_edge", "modresponse", Fixture::EdgeModResponse),
    ("origin_rewrite", "failure", Fixture::EdgeFailure),
    ("origin_rewrite", "modheader", Fixture::OriginModHeader),
    ("origin_rewrite", "modbody", Fixture::OriginModBody),
    ("origin_rewrite", "respond", Fixture::OriginRespond),
    ("origin_rewrite", "moduri", Fixture::OriginModUri),
    ("origin_rewrite", "success", Fixture::EdgeSuccess),
];

impl Fixture {
    pub fn resolve(handler: &str) -> Option<Fixture> {
        let handler = handler.rsplit('/').next().unwrap_or(handler);
        let (module, function) = handler.rsplit_once('.').unwrap_or((DEFAULT_MODULE, handler));

        FIXTURES
            .iter()
            .find(|(m, f, _)| *m == module && *f == function)
            .map(|(_, _, fixture)| *fixture)
    }

    /// Every addressable handler name.
    pub fn names() -> impl Iterator<Item = String> {
        FIXTURES.iter().map(|(m, f, _)| format!("{}.{}", m, f))
    }

    pub async fn invoke(self, event: Value) -> Result<Value, FixtureError> {
        match self {
            Fixture::ApiGatewayProxy => Ok(serde_json::to_value(api_gateway::proxy(event)?)?),
            Fixture::ApiGatewayHello => Ok(serde_json::to_value(api_gateway::hello(event)?)?),
            Fixture::EdgeFailure => lambda_at_edge::failure(event),
            Fixture::EdgeModHeader => lambda_at_edge::modheader(event),
            Fixture::EdgeModBody => lambda_at_edge::modbody(event),
            Fixture::EdgeRespond => lambda_at_edge::respond(event),
            Fixture::EdgeModUri => lambda_at_edge::moduri(event),
            Fixture::EdgeSuccess => lambda_at_edge::success(event),
            Fixture::EdgeProbe => lambda_at_edge::probe(event).await,
            Fixture::EdgeModResponse => lambda_at_edge::modresponse(event),
            Fixture::OriginModHeader => origin_rewrite::modheader(event),
            Fixture::OriginModBody => origin_rewrite::modbody(event),
            Fixture::OriginRespond => origin_rewrite::respond(event),
            Fixture::OriginModUri => origin_rewrite::moduri(event),
        }
    }
}

/// Run the handler named `handler` against `event`.
pub async fn dispatch(handler: &str, event: Value) -> Result<Value, FixtureError> {
    let fixture =
        Fixture::resolve(handler).ok_or_else(|| FixtureError::UnknownHandler(handler.to_string()))?;
    fixture.invoke(event).await
}
