use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};

/// A request as it arrived at the proxy, before or after edge processing.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub client_ip: String,
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IncomingRequest {
    pub fn new(method: Method, path_and_query: impl Into<String>) -> Self {
        Self {
            client_ip: "127.0.0.1".to_string(),
            method,
            path_and_query: path_and_query.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn uri(&self) -> &str {
        self.path_and_query
            .split_once('?')
            .map_or(self.path_and_query.as_str(), |(path, _)| path)
    }

    pub fn querystring(&self) -> &str {
        self.path_and_query
            .split_once('?')
            .map_or("", |(_, query)| query)
    }
}

#[derive(Debug, Clone)]
pub struct EdgeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl EdgeResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), Bytes::new())
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        Self::new(status, headers, body.into())
    }
}

/// Outcome of the viewer-request stage.
#[derive(Debug, Clone)]
pub enum EdgeDecision {
    Forward(IncomingRequest),
    Respond(EdgeResponse),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_and_querystring_split() {
        let request = IncomingRequest::new(Method::GET, "/search?q=rust&page=2");
        assert_eq!(request.uri(), "/search");
        assert_eq!(request.querystring(), "q=rust&page=2");

        let bare = IncomingRequest::new(Method::GET, "/plain");
        assert_eq!(bare.uri(), "/plain");
        assert_eq!(bare.querystring(), "");
    }
}
