use crate::domain::ports::{FunctionInvoker, Invocation};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// Invoker returning a canned invocation and remembering every call.
pub struct MockInvoker {
    response: Invocation,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MockInvoker {
    pub fn new(status_code: u16, function_error: Option<&str>, payload: serde_json::Value) -> Self {
        Self {
            response: Invocation {
                status_code,
                function_error: function_error.map(str::to_string),
                payload: serde_json::to_vec(&payload).unwrap(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(payload: serde_json::Value) -> Self {
        Self::new(200, None, payload)
    }

    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_event(&self) -> serde_json::Value {
        self.calls().last().map(|(_, event)| event.clone()).unwrap()
    }
}

#[async_trait]
impl FunctionInvoker for MockInvoker {
    async fn invoke(&self, function_name: &str, payload: Vec<u8>) -> Result<Invocation> {
        let event = serde_json::from_slice(&payload)?;
        self.calls
            .lock()
            .unwrap()
            .push((function_name.to_string(), event));
        Ok(self.response.clone())
    }
}
