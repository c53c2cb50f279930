use crate::domain::ports::{FunctionInvoker, Invocation};
use crate::utils::error::{EdgeError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";
pub const INVOCATION_TYPE_HEADER: &str = "x-amz-invocation-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationType {
    RequestResponse,
    Event,
    DryRun,
}

impl InvocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationType::RequestResponse => "RequestResponse",
            InvocationType::Event => "Event",
            InvocationType::DryRun => "DryRun",
        }
    }
}

/// Calls functions through the Lambda Invoke HTTP API, unsigned and without
/// retries, the way a local endpoint such as `sam local start-lambda` expects.
#[derive(Debug, Clone)]
pub struct HttpLambdaInvoker {
    client: Client,
    endpoint: Url,
}

impl HttpLambdaInvoker {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| EdgeError::InvalidConfigValueError {
            field: "lambda_endpoint".to_string(),
            value: endpoint.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn invocation_url(&self, function_name: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| EdgeError::ConfigError {
                message: format!("Lambda endpoint cannot be used as a base URL: {}", self.endpoint),
            })?
            .pop_if_empty()
            .extend(["2015-03-31", "functions", function_name, "invocations"]);
        Ok(url)
    }

    pub async fn invoke_with_type(
        &self,
        function_name: &str,
        payload: Vec<u8>,
        invocation_type: InvocationType,
    ) -> Result<Invocation> {
        let url = self.invocation_url(function_name)?;
        tracing::debug!("POST {} ({})", url, invocation_type.as_str());

        let response = self
            .client
            .post(url)
            .header(INVOCATION_TYPE_HEADER, invocation_type.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let payload = response.bytes().await?;

        if status_code >= 400 {
            return Err(EdgeError::LambdaServiceError {
                status: status_code,
                message: String::from_utf8_lossy(&payload).into_owned(),
            });
        }

        Ok(Invocation {
            status_code,
            function_error,
            payload: payload.to_vec(),
        })
    }
}

#[async_trait]
impl FunctionInvoker for HttpLambdaInvoker {
    async fn invoke(&self, function_name: &str, payload: Vec<u8>) -> Result<Invocation> {
        self.invoke_with_type(function_name, payload, InvocationType::RequestResponse)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn invoker(endpoint: &str) -> HttpLambdaInvoker {
        HttpLambdaInvoker::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_invocation_url() {
        let url = invoker("http://127.0.0.1:3001").invocation_url("modheader").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:3001/2015-03-31/functions/modheader/invocations"
        );

        let with_path = invoker("http://127.0.0.1:3001")
            .invocation_url("src/lambda_at_edge.modheader")
            .unwrap();
        assert_eq!(
            with_path.as_str(),
            "http://127.0.0.1:3001/2015-03-31/functions/src%2Flambda_at_edge.modheader/invocations"
        );

        let nested = invoker("http://localhost:3001/lambda/").invocation_url("a.b").unwrap();
        assert_eq!(
            nested.as_str(),
            "http://localhost:3001/lambda/2015-03-31/functions/a.b/invocations"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(HttpLambdaInvoker::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/2015-03-31/functions/success/invocations")
                .header("x-amz-invocation-type", "RequestResponse")
                .body("{\"ping\":true}");
            then.status(200).body("{\"pong\":true}");
        });

        let invocation = invoker(&server.base_url())
            .invoke("success", b"{\"ping\":true}".to_vec())
            .await
            .unwrap();

        mock.assert();
        assert_eq!(invocation.status_code, 200);
        assert_eq!(invocation.function_error, None);
        assert_eq!(invocation.payload, b"{\"pong\":true}".to_vec());
    }

    #[tokio::test]
    async fn test_invoke_function_error_header() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/2015-03-31/functions/failure/invocations");
            then.status(200)
                .header("X-Amz-Function-Error", "Unhandled")
                .body("{\"errorMessage\":\"boom\"}");
        });

        let invocation = invoker(&server.base_url())
            .invoke("failure", b"{}".to_vec())
            .await
            .unwrap();

        assert_eq!(invocation.function_error.as_deref(), Some("Unhandled"));
    }

    #[tokio::test]
    async fn test_invoke_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/2015-03-31/functions/missing/invocations");
            then.status(404).body("{\"Type\":\"User\",\"message\":\"Function not found\"}");
        });

        let err = invoker(&server.base_url())
            .invoke("missing", b"{}".to_vec())
            .await
            .unwrap_err();

        match err {
            EdgeError::LambdaServiceError { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("Function not found"));
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_connection_refused() {
        let err = invoker("http://127.0.0.1:1")
            .invoke("success", b"{}".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, EdgeError::InvokeError(_)));
    }
}
