use crate::core::proxy::EdgeProxy;
use crate::domain::exchange::{EdgeResponse, IncomingRequest};
use crate::domain::ports::{FunctionInvoker, OriginClient};
use crate::utils::error::Result;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

impl IntoResponse for EdgeResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Every method and path goes through the edge proxy. Bodies of any size are
/// accepted; only the copy handed to the viewer-request function is truncated.
pub fn router<I, O>(proxy: Arc<EdgeProxy<I, O>>) -> Router
where
    I: FunctionInvoker + 'static,
    O: OriginClient + 'static,
{
    Router::new()
        .fallback(forward::<I, O>)
        .layer(DefaultBodyLimit::disable())
        .with_state(proxy)
}

async fn forward<I, O>(
    State(proxy): State<Arc<EdgeProxy<I, O>>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> EdgeResponse
where
    I: FunctionInvoker + 'static,
    O: OriginClient + 'static,
{
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let request = IncomingRequest {
        client_ip: peer.ip().to_string(),
        method,
        path_and_query,
        headers,
        body,
    };
    proxy.handle(request).await
}

pub async fn serve<I, O>(listener: TcpListener, proxy: Arc<EdgeProxy<I, O>>) -> Result<()>
where
    I: FunctionInvoker + 'static,
    O: OriginClient + 'static,
{
    let app = router(proxy).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app).await?;
    Ok(())
}
