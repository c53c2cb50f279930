use crate::fixtures::FixtureError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyRequest {
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_base64_encoded: Option<bool>,
}

impl ApiGatewayProxyResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            headers: None,
            body,
            is_base64_encoded: None,
        }
    }
}

// 欄位順序即輸出 JSON 的鍵順序；事件缺少的鍵不輸出，null 照樣輸出
#[derive(Serialize)]
struct ProxyBody {
    header: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Value>,
    message: &'static str,
}

#[derive(Serialize)]
struct HelloBody {
    message: &'static str,
}

pub fn proxy(event: Value) -> Result<ApiGatewayProxyResponse, FixtureError> {
    tracing::info!("{}", serde_json::to_string(&event)?);
    let body = event.get("body").cloned();
    let path = event.get("path").cloned();
    let request: ApiGatewayProxyRequest = serde_json::from_value(event)?;

    let user_agent = request
        .headers
        .as_ref()
        .and_then(|headers| headers.get("User-Agent"))
        .map(String::as_str)
        .unwrap_or("undefined");

    let body = ProxyBody {
        header: format!("user-agent = '{}'", user_agent),
        body,
        path,
        message: "Served by API Gateway Proxy",
    };
    Ok(ApiGatewayProxyResponse::ok(serde_json::to_string(&body)?))
}

pub fn hello(event: Value) -> Result<ApiGatewayProxyResponse, FixtureError> {
    tracing::info!("{}", serde_json::to_string(&event)?);
    let body = HelloBody {
        message: "hello world",
    };
    Ok(ApiGatewayProxyResponse::ok(serde_json::to_string(&body)?))
}
