//! Variants used when the edge function sits in front of an API origin.

use crate::domain::model::CfHeader;
use crate::fixtures::lambda_at_edge::{
    log_json, rewrite_form_body, take_request, HANDLER_HEADER_VALUE,
};
use crate::fixtures::FixtureError;
use serde_json::{json, Value};

pub fn modheader(event: Value) -> Result<Value, FixtureError> {
    let mut request = take_request(&event)?;
    log_json(&request.headers)?;
    request.headers.insert(
        "X-Lambda-Handler".to_string(),
        vec![CfHeader::value_only(HANDLER_HEADER_VALUE)],
    );
    Ok(serde_json::to_value(request)?)
}

pub fn modbody(event: Value) -> Result<Value, FixtureError> {
    let mut request = take_request(&event)?;
    log_json(&request.body)?;
    rewrite_form_body(&mut request, "NewBodyParam", "Body changed by Lambda@Edge")?;
    Ok(serde_json::to_value(request)?)
}

pub fn respond(event: Value) -> Result<Value, FixtureError> {
    take_request(&event)?;
    let response = json!({
        "body": "Redirection Test",
        "bodyEncoding": "text",
        "headers": {
            "x-custom-header": [{"value": "custom-value"}]
        },
        "status": 200,
        "statusDescription": "OK"
    });
    log_json(&response)?;
    Ok(response)
}

pub fn moduri(event: Value) -> Result<Value, FixtureError> {
    let mut request = take_request(&event)?;
    log_json(&request.uri)?;
    request.uri = format!("/dev{}", request.uri);
    Ok(serde_json::to_value(request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        BodyAction, BodyEncoding, CfBody, CfEvent, CfHeaders, CfRequest, EventType,
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn event(uri: &str) -> Value {
        let request = CfRequest {
            client_ip: "127.0.0.1".to_string(),
            headers: CfHeaders::new(),
            method: "GET".to_string(),
            querystring: String::new(),
            uri: uri.to_string(),
            body: None,
        };
        serde_json::to_value(CfEvent::single(EventType::ViewerRequest, request, None)).unwrap()
    }

    #[test]
    fn test_modheader_uses_display_case_key() {
        let output = modheader(event("/")).unwrap();
        assert_eq!(
            output["headers"]["X-Lambda-Handler"],
            json!([{"value": "Header added by Lambda@Edge"}])
        );
    }

    #[test]
    fn test_moduri_prefixes_stage() {
        let output = moduri(event("/hello")).unwrap();
        assert_eq!(output["uri"], "/dev/hello");
    }

    #[test]
    fn test_respond() {
        let output = respond(event("/")).unwrap();
        assert_eq!(output["status"], 200);
        assert_eq!(output["body"], "Redirection Test");
        assert_eq!(output["headers"]["x-custom-header"][0]["value"], "custom-value");
    }

    #[test]
    fn test_modbody_post_matches_node_encoding() {
        let request = CfRequest {
            client_ip: "127.0.0.1".to_string(),
            headers: CfHeaders::new(),
            method: "POST".to_string(),
            querystring: String::new(),
            uri: "/".to_string(),
            body: Some(CfBody {
                input_truncated: false,
                action: Some(BodyAction::ReadOnly),
                encoding: Some(BodyEncoding::Base64),
                data: STANDARD.encode("note=it's"),
            }),
        };
        let input =
            serde_json::to_value(CfEvent::single(EventType::ViewerRequest, request, None)).unwrap();

        let output = modbody(input).unwrap();

        assert_eq!(output["body"]["action"], "replace");
        assert_eq!(output["body"]["encoding"], "text");
        assert_eq!(
            output["body"]["data"],
            "note=it's&NewBodyParam=Body%20changed%20by%20Lambda%40Edge"
        );
    }

    #[test]
    fn test_modbody_without_body_on_get_is_noop() {
        let output = modbody(event("/")).unwrap();
        assert!(output.get("body").is_none());
    }
}
