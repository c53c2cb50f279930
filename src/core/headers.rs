//! Header rules CloudFront applies to edge functions.

use crate::domain::model::{CfHeader, CfHeaders};
use crate::utils::error::{EdgeError, Result};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Headers an edge function may neither see nor set. Entries ending in `*`
/// match every header with that prefix.
pub const FORBIDDEN_HEADERS: &[&str] = &[
    "connection",
    "expect",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "trailer",
    "upgrade",
    "x-accel-buffering",
    "x-accel-charset",
    "x-accel-limit-rate",
    "x-accel-redirect",
    "x-amz-cf-*",
    "x-amzn-auth",
    "x-amzn-cf-billing",
    "x-amzn-cf-id",
    "x-amzn-cf-xff",
    "x-amzn-errotype",
    "x-amzn-fle-profile",
    "x-amzn-header-count",
    "x-amzn-lambda-integration-tag",
    "x-amzn-request-id",
    "x-cache",
    "x-edge-*",
    "x-forwarded-proto",
    "x-real-ip",
];

pub const READ_ONLY_VIEWER_REQUEST: &[&str] =
    &["content-length", "host", "transfer-encoding", "via"];

pub const READ_ONLY_VIEWER_RESPONSE: &[&str] = &[
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "warning",
    "via",
];

pub fn is_forbidden(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    FORBIDDEN_HEADERS.iter().any(|pattern| match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == *pattern,
    })
}

pub fn is_read_only(name: &str, read_only: &[&str]) -> bool {
    read_only.iter().any(|ro| ro.eq_ignore_ascii_case(name))
}

/// `user-agent` -> `User-Agent`
pub fn canonical_key(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Project an HTTP header map into the CloudFront representation, dropping
/// forbidden headers and grouping repeated values under one name.
pub fn to_cf_headers(headers: &HeaderMap) -> CfHeaders {
    let mut cf = CfHeaders::new();
    for (name, value) in headers {
        let name = name.as_str();
        if is_forbidden(name) {
            continue;
        }
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        cf.entry(name.to_string())
            .or_default()
            .push(CfHeader::new(canonical_key(name), value));
    }
    cf
}

fn resolve_header_name(map_key: &str, entries: &[CfHeader]) -> String {
    entries
        .first()
        .and_then(|entry| entry.key.clone())
        .unwrap_or_else(|| map_key.to_string())
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| EdgeError::InvalidHeaderError {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| EdgeError::InvalidHeaderError {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}

fn check_forbidden(cf: &CfHeaders, read_only: &[&str]) -> Result<()> {
    for (map_key, entries) in cf {
        if is_read_only(map_key, read_only) {
            continue;
        }
        let name = resolve_header_name(map_key, entries);
        if is_forbidden(&name) || is_forbidden(map_key) {
            return Err(EdgeError::ForbiddenHeaderError { name });
        }
    }
    Ok(())
}

/// Apply function-returned headers onto `target`.
///
/// Read-only headers are ignored. A single forbidden header rejects the whole
/// update before anything is touched. Headers missing from `cf` are kept.
pub fn apply_cf_headers(target: &mut HeaderMap, cf: &CfHeaders, read_only: &[&str]) -> Result<()> {
    check_forbidden(cf, read_only)?;

    for (map_key, entries) in cf {
        if is_read_only(map_key, read_only) {
            tracing::debug!("Lambda@Edge: ignoring read-only header \"{}\"", map_key);
            continue;
        }
        if entries.is_empty() {
            continue;
        }

        let name = resolve_header_name(map_key, entries);
        let mut parsed = Vec::with_capacity(entries.len());
        for entry in entries {
            parsed.push(parse_header(&name, &entry.value)?);
        }
        let header_name = parsed[0].0.clone();
        let new_values: Vec<HeaderValue> = parsed.into_iter().map(|(_, value)| value).collect();
        let current: Vec<&HeaderValue> = target.get_all(&header_name).iter().collect();
        let joined = entries
            .iter()
            .map(|entry| entry.value.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        if current.is_empty() {
            tracing::info!("Lambda@Edge: Header added: \"{}\": \"{}\"", name, joined);
        } else if current.len() != new_values.len()
            || current.iter().zip(&new_values).any(|(old, new)| *old != new)
        {
            tracing::info!("Lambda@Edge: Header modified: \"{}\": \"{}\"", name, joined);
        } else {
            continue;
        }

        target.remove(&header_name);
        for value in new_values {
            target.append(header_name.clone(), value);
        }
    }
    Ok(())
}

/// Build the header map of a response generated by a function.
pub fn cf_headers_to_map(cf: &CfHeaders) -> Result<HeaderMap> {
    check_forbidden(cf, &[])?;

    let mut map = HeaderMap::new();
    for (map_key, entries) in cf {
        let name = resolve_header_name(map_key, entries);
        for entry in entries {
            let (header_name, header_value) = parse_header(&name, &entry.value)?;
            map.append(header_name, header_value);
        }
    }
    Ok(map)
}
