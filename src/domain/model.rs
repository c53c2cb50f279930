//! CloudFront Lambda@Edge event model.
//!
//! Field names and nesting follow the JSON CloudFront hands to edge
//! functions, so these types serialize into the exact event shape and accept
//! whatever a function sends back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DISTRIBUTION_DOMAIN_NAME: &str = "dummy.cloudfront.net";
pub const DISTRIBUTION_ID: &str = "DUMMYIDEXAMPLE";
pub const REQUEST_ID: &str = "IsThisReallyNeeded";

/// Headers keyed by lowercase name. Each name maps to one entry per value.
pub type CfHeaders = BTreeMap<String, Vec<CfHeader>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

impl CfHeader {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }

    pub fn value_only(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    ViewerRequest,
    ViewerResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfConfig {
    pub distribution_domain_name: String,
    pub distribution_id: String,
    pub event_type: EventType,
    pub request_id: String,
}

impl CfConfig {
    pub fn local(event_type: EventType) -> Self {
        Self {
            distribution_domain_name: DISTRIBUTION_DOMAIN_NAME.to_string(),
            distribution_id: DISTRIBUTION_ID.to_string(),
            event_type,
            request_id: REQUEST_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyAction {
    ReadOnly,
    Replace,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    Base64,
    Text,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfBody {
    #[serde(default)]
    pub input_truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<BodyAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<BodyEncoding>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRequest {
    #[serde(default)]
    pub client_ip: String,
    pub headers: CfHeaders,
    #[serde(default)]
    pub method: String,
    pub querystring: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CfBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfResponse {
    #[serde(with = "status_code")]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(default)]
    pub headers: CfHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<BodyEncoding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfPayload {
    pub config: CfConfig,
    pub request: CfRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<CfResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfRecord {
    pub cf: CfPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfEvent {
    #[serde(rename = "Records")]
    pub records: Vec<CfRecord>,
}

impl CfEvent {
    pub fn single(event_type: EventType, request: CfRequest, response: Option<CfResponse>) -> Self {
        Self {
            records: vec![CfRecord {
                cf: CfPayload {
                    config: CfConfig::local(event_type),
                    request,
                    response,
                },
            }],
        }
    }

    pub fn payload(&self) -> Option<&CfPayload> {
        self.records.first().map(|record| &record.cf)
    }

    pub fn into_payload(self) -> Option<CfPayload> {
        self.records.into_iter().next().map(|record| record.cf)
    }
}

/// What an edge function handed back: a request to keep processing, or a
/// response that short-circuits the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionOutput {
    Request(CfRequest),
    Response(CfResponse),
}

impl FunctionOutput {
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        if value.get("status").is_some() {
            Ok(FunctionOutput::Response(serde_json::from_value(value)?))
        } else {
            Ok(FunctionOutput::Request(serde_json::from_value(value)?))
        }
    }
}

/// CloudFront sends the status as a string but functions commonly return a
/// number; accept both and always emit the string form.
mod status_code {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawStatus {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(status: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&status.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        match RawStatus::deserialize(deserializer)? {
            RawStatus::Number(n) => u16::try_from(n)
                .map_err(|_| de::Error::custom(format!("status out of range: {}", n))),
            RawStatus::Text(s) => s
                .trim()
                .parse::<u16>()
                .map_err(|_| de::Error::custom(format!("invalid status: {:?}", s))),
        }
    }
}
