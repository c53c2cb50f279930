use crate::core::headers::{
    apply_cf_headers, cf_headers_to_map, to_cf_headers, READ_ONLY_VIEWER_REQUEST,
};
use crate::core::invocation::invoke_edge_function;
use crate::domain::exchange::{EdgeDecision, EdgeResponse, IncomingRequest};
use crate::domain::model::{
    BodyAction, BodyEncoding, CfBody, CfEvent, CfRequest, CfResponse, EventType, FunctionOutput,
};
use crate::domain::ports::FunctionInvoker;
use crate::utils::error::{EdgeError, Result};
use axum::body::Bytes;
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

/// Largest request body CloudFront exposes to a viewer-request function.
pub const MAX_VIEWER_REQUEST_BODY: usize = 40 * 1024;

pub struct ViewerRequestProcessor<I: FunctionInvoker> {
    invoker: Arc<I>,
    function_name: Option<String>,
    include_body: bool,
}

impl<I: FunctionInvoker> ViewerRequestProcessor<I> {
    pub fn new(invoker: Arc<I>, function_name: Option<String>) -> Self {
        Self {
            invoker,
            function_name,
            include_body: true,
        }
    }

    pub fn with_body(mut self, include_body: bool) -> Self {
        self.include_body = include_body;
        self
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    pub fn build_event(&self, request: &IncomingRequest) -> CfEvent {
        CfEvent::single(
            EventType::ViewerRequest,
            cf_request_from(request, self.include_body),
            None,
        )
    }

    pub async fn process(&self, request: IncomingRequest) -> Result<EdgeDecision> {
        let Some(function_name) = self.function_name.as_deref() else {
            return Ok(EdgeDecision::Forward(request));
        };

        let event = self.build_event(&request);
        match invoke_edge_function(self.invoker.as_ref(), function_name, &event).await? {
            // 直接回應，不連線到 origin
            FunctionOutput::Response(response) => {
                Ok(EdgeDecision::Respond(build_response(response)?))
            }
            FunctionOutput::Request(cf_request) => {
                Ok(EdgeDecision::Forward(apply_request(request, cf_request)?))
            }
        }
    }
}

/// Snapshot an incoming request as the `request` object of an edge event.
pub fn cf_request_from(request: &IncomingRequest, include_body: bool) -> CfRequest {
    let body = include_body.then(|| {
        let truncated = request.body.len() > MAX_VIEWER_REQUEST_BODY;
        let data = if truncated {
            &request.body[..MAX_VIEWER_REQUEST_BODY]
        } else {
            &request.body[..]
        };
        CfBody {
            input_truncated: truncated,
            action: Some(BodyAction::ReadOnly),
            encoding: Some(BodyEncoding::Base64),
            data: STANDARD.encode(data),
        }
    });

    CfRequest {
        client_ip: request.client_ip.clone(),
        headers: to_cf_headers(&request.headers),
        method: request.method.to_string(),
        querystring: request.querystring().to_string(),
        uri: request.uri().to_string(),
        body,
    }
}

/// Overwrite body, URI and headers of `request` with what the function returned.
pub fn apply_request(mut request: IncomingRequest, cf: CfRequest) -> Result<IncomingRequest> {
    if let Some(body) = &cf.body {
        apply_body(&mut request, body)?;
    }
    apply_uri(&mut request, &cf.uri, &cf.querystring)?;
    apply_cf_headers(&mut request.headers, &cf.headers, READ_ONLY_VIEWER_REQUEST)?;
    Ok(request)
}

fn apply_body(request: &mut IncomingRequest, body: &CfBody) -> Result<()> {
    if body.action != Some(BodyAction::Replace) {
        return Ok(());
    }

    tracing::info!("Lambda@Edge: replacing body");
    request.body = decode_body(&body.data, body.encoding)?;
    Ok(())
}

fn apply_uri(request: &mut IncomingRequest, uri: &str, querystring: &str) -> Result<()> {
    if !uri.starts_with('/') {
        return Err(EdgeError::InvalidUriError {
            uri: uri.to_string(),
        });
    }

    let mut path_and_query = uri.to_string();
    if !querystring.is_empty() {
        path_and_query.push('?');
        path_and_query.push_str(querystring);
    }

    if request.path_and_query != path_and_query {
        tracing::info!("Lambda@Edge: replacing URI to {}", path_and_query);
        request.path_and_query = path_and_query;
    }
    Ok(())
}

fn decode_body(data: &str, encoding: Option<BodyEncoding>) -> Result<Bytes> {
    match encoding {
        Some(BodyEncoding::Base64) => Ok(Bytes::from(STANDARD.decode(data)?)),
        Some(BodyEncoding::Text) => Ok(Bytes::from(data.to_string())),
        Some(BodyEncoding::Unsupported) => Err(EdgeError::UnsupportedEncodingError {
            encoding: "unsupported".to_string(),
        }),
        None => Err(EdgeError::UnsupportedEncodingError {
            encoding: "missing".to_string(),
        }),
    }
}

/// Turn a function-generated response into the reply sent to the viewer.
pub fn build_response(cf: CfResponse) -> Result<EdgeResponse> {
    let status = parse_status(cf.status)?;
    let body = decode_body(
        cf.body.as_deref().unwrap_or_default(),
        Some(cf.body_encoding.unwrap_or(BodyEncoding::Text)),
    )?;
    let headers = cf_headers_to_map(&cf.headers)?;

    tracing::info!("Lambda@Edge: generated response: {}", status.as_u16());
    Ok(EdgeResponse::new(status, headers, body))
}

pub(crate) fn parse_status(status: u16) -> Result<StatusCode> {
    StatusCode::from_u16(status)
        .ok()
        .filter(|code| (100..=599).contains(&code.as_u16()))
        .ok_or_else(|| EdgeError::InvalidStatusError {
            status: status.to_string(),
        })
}
