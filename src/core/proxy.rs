use crate::core::viewer_request::{cf_request_from, ViewerRequestProcessor};
use crate::core::viewer_response::ViewerResponseProcessor;
use crate::domain::exchange::{EdgeDecision, EdgeResponse, IncomingRequest};
use crate::domain::ports::{ConfigProvider, FunctionInvoker, OriginClient};
use crate::utils::error::{EdgeError, ErrorCategory, Result};
use axum::http::StatusCode;
use std::sync::Arc;

/// Chains viewer-request, origin and viewer-response for one request.
pub struct EdgeProxy<I: FunctionInvoker, O: OriginClient> {
    viewer_request: ViewerRequestProcessor<I>,
    viewer_response: ViewerResponseProcessor<I>,
    origin: O,
}

impl<I: FunctionInvoker, O: OriginClient> EdgeProxy<I, O> {
    pub fn new(invoker: Arc<I>, origin: O, config: &impl ConfigProvider) -> Self {
        let viewer_request = ViewerRequestProcessor::new(
            invoker.clone(),
            config.viewer_request_function().map(str::to_string),
        )
        .with_body(config.include_body());
        let viewer_response = ViewerResponseProcessor::new(
            invoker,
            config.viewer_response_function().map(str::to_string),
        );
        Self::from_parts(viewer_request, viewer_response, origin)
    }

    pub fn from_parts(
        viewer_request: ViewerRequestProcessor<I>,
        viewer_response: ViewerResponseProcessor<I>,
        origin: O,
    ) -> Self {
        Self {
            viewer_request,
            viewer_response,
            origin,
        }
    }

    pub async fn handle(&self, request: IncomingRequest) -> EdgeResponse {
        let method = request.method.clone();
        let path = request.path_and_query.clone();

        match self.try_handle(request).await {
            Ok(response) => {
                tracing::debug!("{} {} -> {}", method, path, response.status.as_u16());
                response
            }
            Err(e) => {
                tracing::error!(
                    "❌ {} {} failed: {} (Category: {:?})",
                    method,
                    path,
                    e,
                    e.category()
                );
                tracing::debug!("💡 {}", e.recovery_suggestion());
                error_response(&e)
            }
        }
    }

    async fn try_handle(&self, request: IncomingRequest) -> Result<EdgeResponse> {
        let forwarded = match self.viewer_request.process(request).await? {
            // 產生的回應不會再觸發 viewer-response
            EdgeDecision::Respond(response) => return Ok(response),
            EdgeDecision::Forward(request) => request,
        };

        let snapshot = cf_request_from(&forwarded, false);
        let response = self.origin.forward(forwarded).await?;
        self.viewer_response.process(&snapshot, response).await
    }
}

/// Reply sent to the viewer when a request could not be completed.
pub fn error_response(err: &EdgeError) -> EdgeResponse {
    match err {
        EdgeError::UnexpectedStatusError { .. } => {
            EdgeResponse::text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        EdgeError::FunctionError { .. } => {
            EdgeResponse::text(StatusCode::BAD_GATEWAY, err.to_string())
        }
        EdgeError::ForbiddenHeaderError { .. }
        | EdgeError::InvalidUriError { .. }
        | EdgeError::UnsupportedEncodingError { .. } => {
            EdgeResponse::empty(StatusCode::BAD_GATEWAY)
        }
        EdgeError::OriginError { message } => {
            EdgeResponse::text(StatusCode::BAD_GATEWAY, format!("Bad Gateway: {}", message))
        }
        _ if err.category() == ErrorCategory::Configuration => {
            EdgeResponse::text(StatusCode::INTERNAL_SERVER_ERROR, format!("Exception: {}", err))
        }
        _ => EdgeResponse::text(StatusCode::BAD_GATEWAY, format!("Exception: {}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockInvoker;
    use axum::http::{HeaderMap, Method};
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingOrigin {
        seen: Mutex<Vec<IncomingRequest>>,
        fail: bool,
    }

    impl RecordingOrigin {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn seen(&self) -> Vec<IncomingRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl<'a> OriginClient for &'a RecordingOrigin {
        async fn forward(&self, request: IncomingRequest) -> Result<EdgeResponse> {
            self.seen.lock().unwrap().push(request);
            if self.fail {
                return Err(EdgeError::OriginError {
                    message: "connection refused".to_string(),
                });
            }
            Ok(EdgeResponse::new(StatusCode::OK, HeaderMap::new(), "from origin"))
        }
    }

    fn proxy<'a>(
        invoker: MockInvoker,
        request_fn: Option<&str>,
        origin: &'a RecordingOrigin,
    ) -> EdgeProxy<MockInvoker, &'a RecordingOrigin> {
        let invoker = Arc::new(invoker);
        EdgeProxy::from_parts(
            ViewerRequestProcessor::new(invoker.clone(), request_fn.map(str::to_string)),
            ViewerResponseProcessor::new(invoker, None),
            origin,
        )
    }

    #[tokio::test]
    async fn test_forwards_to_origin_without_function() {
        let origin = RecordingOrigin::new();
        let proxy = proxy(MockInvoker::returning(json!({})), None, &origin);

        let response = proxy.handle(IncomingRequest::new(Method::GET, "/hello")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "from origin");
        assert_eq!(origin.seen()[0].path_and_query, "/hello");
    }

    #[tokio::test]
    async fn test_generated_response_skips_origin() {
        let origin = RecordingOrigin::new();
        let proxy = proxy(
            MockInvoker::returning(json!({"status": 200, "body": "Redirection Test"})),
            Some("respond"),
            &origin,
        );

        let response = proxy.handle(IncomingRequest::new(Method::GET, "/")).await;

        assert_eq!(response.body, "Redirection Test");
        assert!(origin.seen().is_empty());
    }

    #[tokio::test]
    async fn test_function_error_becomes_502() {
        let origin = RecordingOrigin::new();
        let proxy = proxy(
            MockInvoker::new(200, Some("Unhandled"), json!({"errorMessage": "boom"})),
            Some("failure"),
            &origin,
        );

        let response = proxy.handle(IncomingRequest::new(Method::GET, "/")).await;

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        let body = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(body.starts_with("Lambda@Edge Error: Unhandled\n"));
        assert!(origin.seen().is_empty());
    }

    #[tokio::test]
    async fn test_origin_failure_becomes_502() {
        let origin = RecordingOrigin::failing();
        let proxy = proxy(MockInvoker::returning(json!({})), None, &origin);

        let response = proxy.handle(IncomingRequest::new(Method::GET, "/")).await;

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.body, "Bad Gateway: connection refused");
    }

    #[test]
    fn test_error_response_mapping() {
        let status = error_response(&EdgeError::UnexpectedStatusError { status: 204 });
        assert_eq!(status.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status.body, "Lambda@Edge StatusCode: 204");

        let forbidden = error_response(&EdgeError::ForbiddenHeaderError {
            name: "x-cache".to_string(),
        });
        assert_eq!(forbidden.status, StatusCode::BAD_GATEWAY);
        assert!(forbidden.body.is_empty());

        let exception = error_response(&EdgeError::LambdaServiceError {
            status: 404,
            message: "ResourceNotFoundException".to_string(),
        });
        assert_eq!(exception.status, StatusCode::BAD_GATEWAY);
        assert_eq!(exception.headers["content-type"], "text/plain");
        assert!(exception.body.starts_with(b"Exception: "));
    }
}
