use crate::domain::exchange::{EdgeResponse, IncomingRequest};
use crate::domain::ports::OriginClient;
use crate::utils::error::{EdgeError, Result};
use async_trait::async_trait;
use axum::http::header::{CONTENT_LENGTH, HOST};
use axum::http::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Connection-scoped headers that must not cross the proxy.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

#[derive(Debug, Clone)]
pub struct HttpOrigin {
    client: Client,
    base: Url,
}

impl HttpOrigin {
    pub fn new(origin: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(origin).map_err(|e| EdgeError::InvalidConfigValueError {
            field: "origin".to_string(),
            value: origin.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        // 轉送 redirect 給 viewer，而不是自行跟隨
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base })
    }

    /// Origin path prefixes are kept: `http://api:3000/dev` + `/items?a=1`.
    pub fn target_url(&self, path_and_query: &str) -> Result<Url> {
        let base = self.base.as_str().trim_end_matches('/');
        let target = format!("{}{}", base, path_and_query);
        Url::parse(&target).map_err(|e| EdgeError::OriginError {
            message: format!("Invalid origin URL {}: {}", target, e),
        })
    }
}

#[async_trait]
impl OriginClient for HttpOrigin {
    async fn forward(&self, request: IncomingRequest) -> Result<EdgeResponse> {
        let url = self.target_url(&request.path_and_query)?;
        tracing::debug!("Forwarding {} {} to origin", request.method, url);

        let mut headers = request.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(HOST);
        headers.remove(CONTENT_LENGTH);
        if let Ok(client_ip) = HeaderValue::from_str(&request.client_ip) {
            headers.append("x-forwarded-for", client_ip);
        }

        let response = self
            .client
            .request(request.method, url)
            .headers(headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| EdgeError::OriginError {
                message: e.to_string(),
            })?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_by_hop(&mut headers);
        headers.remove(CONTENT_LENGTH);

        let body = response.bytes().await.map_err(|e| EdgeError::OriginError {
            message: e.to_string(),
        })?;

        Ok(EdgeResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{Method, StatusCode};
    use httpmock::prelude::*;

    fn origin(base: &str) -> HttpOrigin {
        HttpOrigin::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_target_url_keeps_prefix() {
        let url = origin("http://api:3000/dev/").target_url("/items?a=1").unwrap();
        assert_eq!(url.as_str(), "http://api:3000/dev/items?a=1");
    }

    #[tokio::test]
    async fn test_forward_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/submit")
                .query_param("x", "1")
                .header("x-lambda-handler", "Header added by Lambda@Edge")
                .header("x-forwarded-for", "10.0.0.7")
                .body("a=1");
            then.status(201)
                .header("content-type", "text/plain")
                .body("created");
        });

        let mut request = IncomingRequest::new(Method::POST, "/submit?x=1");
        request.client_ip = "10.0.0.7".to_string();
        request.headers.insert(
            "x-lambda-handler",
            HeaderValue::from_static("Header added by Lambda@Edge"),
        );
        request
            .headers
            .insert("connection", HeaderValue::from_static("keep-alive"));
        request.body = Bytes::from_static(b"a=1");

        let response = origin(&server.base_url()).forward(request).await.unwrap();

        mock.assert();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.headers["content-type"], "text/plain");
        assert!(response.headers.get("content-length").is_none());
        assert_eq!(response.body, "created");
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/old");
            then.status(302).header("location", "/new");
        });

        let response = origin(&server.base_url())
            .forward(IncomingRequest::new(Method::GET, "/old"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers["location"], "/new");
    }

    #[tokio::test]
    async fn test_unreachable_origin_behind_trait_object() {
        let client: Box<dyn OriginClient> = Box::new(origin("http://127.0.0.1:1"));
        let err = client
            .forward(IncomingRequest::new(Method::GET, "/"))
            .await
            .unwrap_err();
        assert!(matches!(err, EdgeError::OriginError { .. }));
    }
}
