pub mod headers;
pub mod invocation;
pub mod proxy;
pub mod viewer_request;
pub mod viewer_response;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::exchange::{EdgeDecision, EdgeResponse, IncomingRequest};
pub use crate::domain::ports::{ConfigProvider, FunctionInvoker, Invocation, OriginClient};
pub use crate::utils::error::Result;
