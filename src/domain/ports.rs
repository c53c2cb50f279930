use crate::domain::exchange::{EdgeResponse, IncomingRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Raw result of a synchronous function invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub status_code: u16,
    pub function_error: Option<String>,
    pub payload: Vec<u8>,
}

#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(&self, function_name: &str, payload: Vec<u8>) -> Result<Invocation>;
}

#[async_trait]
pub trait OriginClient: Send + Sync {
    async fn forward(&self, request: IncomingRequest) -> Result<EdgeResponse>;
}

pub trait ConfigProvider: Send + Sync {
    fn listen_addr(&self) -> &str;
    fn origin(&self) -> &str;
    fn lambda_endpoint(&self) -> &str;
    fn viewer_request_function(&self) -> Option<&str>;
    fn viewer_response_function(&self) -> Option<&str>;
    fn invoke_timeout(&self) -> Duration;
    fn include_body(&self) -> bool;
}
