use crate::core::headers::{apply_cf_headers, to_cf_headers, READ_ONLY_VIEWER_RESPONSE};
use crate::core::invocation::invoke_edge_function;
use crate::core::viewer_request::parse_status;
use crate::domain::exchange::EdgeResponse;
use crate::domain::model::{CfEvent, CfRequest, CfResponse, EventType, FunctionOutput};
use crate::domain::ports::FunctionInvoker;
use crate::utils::error::{EdgeError, Result};
use std::sync::Arc;

pub struct ViewerResponseProcessor<I: FunctionInvoker> {
    invoker: Arc<I>,
    function_name: Option<String>,
}

impl<I: FunctionInvoker> ViewerResponseProcessor<I> {
    pub fn new(invoker: Arc<I>, function_name: Option<String>) -> Self {
        Self {
            invoker,
            function_name,
        }
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    pub fn build_event(&self, request: &CfRequest, response: &EdgeResponse) -> CfEvent {
        let mut request = request.clone();
        // viewer-response 事件不帶 body
        request.body = None;

        let cf_response = CfResponse {
            status: response.status.as_u16(),
            status_description: response.status.canonical_reason().map(str::to_string),
            headers: to_cf_headers(&response.headers),
            body: None,
            body_encoding: None,
        };
        CfEvent::single(EventType::ViewerResponse, request, Some(cf_response))
    }

    /// `request` is the snapshot taken after the viewer-request stage.
    pub async fn process(
        &self,
        request: &CfRequest,
        mut response: EdgeResponse,
    ) -> Result<EdgeResponse> {
        let Some(function_name) = self.function_name.as_deref() else {
            return Ok(response);
        };

        let event = self.build_event(request, &response);
        let cf = match invoke_edge_function(self.invoker.as_ref(), function_name, &event).await? {
            FunctionOutput::Response(cf) => cf,
            FunctionOutput::Request(_) => {
                return Err(EdgeError::InvalidStatusError {
                    status: "missing".to_string(),
                })
            }
        };

        if cf.body.is_some() {
            tracing::warn!(
                "Lambda@Edge: viewer-response functions cannot replace the body, ignoring it"
            );
        }

        let status = parse_status(cf.status)?;
        if status != response.status {
            tracing::info!(
                "Lambda@Edge: replacing status {} with {}",
                response.status.as_u16(),
                status.as_u16()
            );
            response.status = status;
        }
        apply_cf_headers(&mut response.headers, &cf.headers, READ_ONLY_VIEWER_RESPONSE)?;
        Ok(response)
    }
}
