use crate::domain::model::{CfEvent, FunctionOutput};
use crate::domain::ports::FunctionInvoker;
use crate::utils::error::{EdgeError, Result};

/// Run an edge function against `event` and classify what it returned.
pub async fn invoke_edge_function<I>(
    invoker: &I,
    function_name: &str,
    event: &CfEvent,
) -> Result<FunctionOutput>
where
    I: FunctionInvoker + ?Sized,
{
    let payload = serde_json::to_vec(event)?;
    tracing::debug!(
        "Invoking {} with {} byte event",
        function_name,
        payload.len()
    );

    let invocation = invoker.invoke(function_name, payload).await?;

    if invocation.status_code != 200 {
        tracing::error!("Lambda@Edge StatusCode: {}", invocation.status_code);
        return Err(EdgeError::UnexpectedStatusError {
            status: invocation.status_code,
        });
    }

    if let Some(kind) = invocation.function_error {
        let payload = String::from_utf8_lossy(&invocation.payload).into_owned();
        tracing::error!("Lambda@Edge function {} failed ({}): {}", function_name, kind, payload);
        return Err(EdgeError::FunctionError { kind, payload });
    }

    let value: serde_json::Value = serde_json::from_slice(&invocation.payload)?;
    Ok(FunctionOutput::from_value(value)?)
}
