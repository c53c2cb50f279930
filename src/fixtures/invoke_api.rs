//! Local stand-in for the Lambda Invoke API serving the fixtures.

use crate::fixtures::Fixture;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::time::Duration;

/// Lambda@Edge caps viewer functions at five seconds.
pub const DEFAULT_FUNCTION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct InvokeApiState {
    pub function_timeout: Duration,
}

impl Default for InvokeApiState {
    fn default() -> Self {
        Self {
            function_timeout: DEFAULT_FUNCTION_TIMEOUT,
        }
    }
}

pub fn router(state: InvokeApiState) -> Router {
    Router::new()
        .route(
            "/2015-03-31/functions/{function_name}/invocations",
            post(invoke),
        )
        .with_state(state)
}

fn service_error(status: StatusCode, error_type: &'static str, message: String) -> Response {
    tracing::warn!("{}: {}", error_type, message);
    (
        status,
        [("x-amzn-errortype", error_type)],
        Json(json!({"Type": "User", "message": message})),
    )
        .into_response()
}

async fn invoke(
    State(state): State<InvokeApiState>,
    Path(function_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(fixture) = Fixture::resolve(&function_name) else {
        return service_error(
            StatusCode::NOT_FOUND,
            "ResourceNotFoundException",
            format!("Function not found: {}", function_name),
        );
    };

    let event: Value = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(event) => event,
            Err(e) => {
                return service_error(
                    StatusCode::BAD_REQUEST,
                    "InvalidRequestContentException",
                    format!("Could not parse request body into json: {}", e),
                )
            }
        }
    };

    let invocation_type = headers
        .get("x-amz-invocation-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("RequestResponse");

    match invocation_type {
        "RequestResponse" => {}
        "Event" => {
            let timeout = state.function_timeout;
            tokio::spawn(async move {
                let _ = run_fixture(fixture, event, timeout).await;
            });
            return StatusCode::ACCEPTED.into_response();
        }
        "DryRun" => return StatusCode::NO_CONTENT.into_response(),
        other => {
            return service_error(
                StatusCode::BAD_REQUEST,
                "InvalidParameterValueException",
                format!("Unsupported invocation type: {}", other),
            )
        }
    }

    tracing::info!("Invoking {} ({:?})", function_name, fixture);
    match run_fixture(fixture, event, state.function_timeout).await {
        Ok(output) => (
            StatusCode::OK,
            [("x-amz-executed-version", "$LATEST")],
            Json(output),
        )
            .into_response(),
        Err(error_payload) => (
            StatusCode::OK,
            [
                ("x-amz-executed-version", "$LATEST"),
                ("x-amz-function-error", "Unhandled"),
            ],
            Json(error_payload),
        )
            .into_response(),
    }
}

/// Run a fixture under the function timeout; the error side is the
/// payload Lambda would return.
async fn run_fixture(fixture: Fixture, event: Value, timeout: Duration) -> Result<Value, Value> {
    match tokio::time::timeout(timeout, fixture.invoke(event)).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => {
            tracing::error!("{:?} failed: {} ({})", fixture, e, e.error_type());
            Err(e.to_payload())
        }
        Err(_) => {
            let message = format!("Task timed out after {:.2} seconds", timeout.as_secs_f64());
            tracing::error!("{:?}: {}", fixture, message);
            Err(json!({"errorMessage": message}))
        }
    }
}
