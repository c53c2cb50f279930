use crate::domain::model::{BodyAction, BodyEncoding, CfHeader, CfRequest, CfResponse};
use crate::fixtures::FixtureError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value};
use url::form_urlencoded;

pub const HANDLER_HEADER: &str = "x-lambda-handler";
pub const HANDLER_HEADER_VALUE: &str = "Header added by Lambda@Edge";

/// Everything but alphanumerics and `-._~!'()*` is escaped, spaces as `%20`.
const FORM_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

pub(crate) fn encode_form(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, FORM_COMPONENT),
                utf8_percent_encode(value, FORM_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn take_request(event: &Value) -> Result<CfRequest, FixtureError> {
    let request = event
        .pointer("/Records/0/cf/request")
        .ok_or_else(|| FixtureError::InvalidEvent("Records[0].cf.request is missing".to_string()))?;
    Ok(serde_json::from_value(request.clone())?)
}

pub(crate) fn take_response(event: &Value) -> Result<CfResponse, FixtureError> {
    let response = event
        .pointer("/Records/0/cf/response")
        .ok_or_else(|| {
            FixtureError::InvalidEvent("Records[0].cf.response is missing".to_string())
        })?;
    Ok(serde_json::from_value(response.clone())?)
}

pub(crate) fn log_json<T: serde::Serialize>(value: &T) -> Result<(), FixtureError> {
    tracing::info!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Decode a POSTed form body, set `param` and mark the body for replacement.
pub(crate) fn rewrite_form_body(
    request: &mut CfRequest,
    param: &str,
    value: &str,
) -> Result<(), FixtureError> {
    if request.method != "POST" {
        return Ok(());
    }
    let body = request
        .body
        .as_mut()
        .ok_or_else(|| FixtureError::InvalidEvent("request.body is missing".to_string()))?;

    let raw = STANDARD
        .decode(&body.data)
        .map_err(|e| FixtureError::InvalidEvent(format!("request.body.data: {}", e)))?;
    let text = String::from_utf8_lossy(&raw);
    tracing::info!("Mod Body: {}", text);

    let mut params: Vec<(String, String)> =
        form_urlencoded::parse(text.as_bytes()).into_owned().collect();
    match params.iter().position(|(k, _)| k == param) {
        Some(index) => {
            params[index].1 = value.to_string();
            let mut seen = false;
            params.retain(|(k, _)| {
                if k != param {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
        }
        None => params.push((param.to_string(), value.to_string())),
    }

    body.action = Some(BodyAction::Replace);
    body.encoding = Some(BodyEncoding::Text);
    body.data = encode_form(&params);
    Ok(())
}

pub fn failure(event: Value) -> Result<Value, FixtureError> {
    take_request(&event)?;
    Err(FixtureError::Thrown(
        "This is a test of Lambda@Edge function call failure".to_string(),
    ))
}

pub fn modheader(event: Value) -> Result<Value, FixtureError> {
    let mut request = take_request(&event)?;
    request.headers.insert(
        HANDLER_HEADER.to_string(),
        vec![CfHeader::value_only(HANDLER_HEADER_VALUE)],
    );
    log_json(&request.headers)?;
    Ok(serde_json::to_value(request)?)
}

pub fn modbody(event: Value) -> Result<Value, FixtureError> {
    let mut request = take_request(&event)?;
    rewrite_form_body(&mut request, "NewParam", "Body_changed_by_Lambda@Edge")?;
    log_json(&request.body)?;
    Ok(serde_json::to_value(request)?)
}

pub fn respond(event: Value) -> Result<Value, FixtureError> {
    take_request(&event)?;
    let response = json!({
        "body": "{\"message\":\"Served_by_Lambda@Edge\"}",
        "bodyEncoding": "text",
        "headers": {
            "content-type": [{"value": "application/json"}],
            "x-lambda-handler": [{"value": HANDLER_HEADER_VALUE}]
        },
        "status": 202,
        "statusDescription": "Accepted Allright"
    });
    log_json(&response)?;
    Ok(response)
}

pub fn moduri(event: Value) -> Result<Value, FixtureError> {
    let mut request = take_request(&event)?;
    request.uri = "/Request_URI_Modified_by_Lambda@Edge".to_string();
    log_json(&request.uri)?;
    Ok(serde_json::to_value(request)?)
}

pub fn success(event: Value) -> Result<Value, FixtureError> {
    let request = take_request(&event)?;
    log_json(&request)?;
    Ok(serde_json::to_value(request)?)
}

/// Viewer-response fixture: tag the origin response.
pub fn modresponse(event: Value) -> Result<Value, FixtureError> {
    let mut response = take_response(&event)?;
    response.headers.insert(
        HANDLER_HEADER.to_string(),
        vec![CfHeader::value_only(HANDLER_HEADER_VALUE)],
    );
    log_json(&response.headers)?;
    Ok(serde_json::to_value(response)?)
}

/// Query-string driven fixture for probing how the caller reports failures.
///
/// `simulate=malformed|timeout|novalue|exception` picks a failure mode;
/// `key`+`value` set a header and `uri` replaces the URI.
pub async fn probe(event: Value) -> Result<Value, FixtureError> {
    let mut request = take_request(&event)?;
    log_json(&request)?;

    let params: Vec<(String, String)> = form_urlencoded::parse(request.querystring.as_bytes())
        .into_owned()
        .collect();
    let param = |name: &str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };

    match param("simulate").as_deref() {
        Some("malformed") => {
            return Ok(json!({
                "message": "This is a malformed Lambda@Edge return value"
            }))
        }
        Some("timeout") => {
            tracing::info!("Simulating a timeout, this invocation never returns");
            return std::future::pending().await;
        }
        Some("novalue") => {
            let mut output = serde_json::to_value(&request)?;
            output["headers"]["x-lambda-novalue"] = json!([{"key": "X-Lambda-NoValue"}]);
            return Ok(output);
        }
        Some("exception") => {
            return Err(FixtureError::Exception(
                "This is a test of Lambda@Edge exception handling".to_string(),
            ))
        }
        Some(other) => tracing::warn!("Unknown simulate value: {}", other),
        None => {}
    }

    if let (Some(key), Some(value)) = (param("key"), param("value")) {
        request
            .headers
            .insert(key.to_ascii_lowercase(), vec![CfHeader::new(key, value)]);
    }
    if let Some(uri) = param("uri") {
        request.uri = uri;
    }
    Ok(serde_json::to_value(request)?)
}
