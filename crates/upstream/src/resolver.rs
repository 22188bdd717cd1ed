//! Ordered fallback over candidate upstream endpoints.
//!
//! Candidates are tried strictly one after another, once each, and the first
//! successful JSON body wins. Failures are folded into the returned outcome;
//! nothing here returns `Err` to the caller.

use serde_json::Value;
use tracing::{info, warn};

use crate::transport::{TransportError, UpstreamTransport};

pub const EXHAUSTED_CANDIDATES_MESSAGE: &str = "no upstream endpoint responded successfully";

const SHAPE_KEY_LIMIT: usize = 6;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchOutcome {
    pub data: Option<Value>,
    pub error: Option<String>,
    pub endpoints_tried: Vec<String>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailFetch {
    pub data: Option<Value>,
    pub error: Option<String>,
    pub not_found: bool,
}

pub async fn fetch_candidates(
    transport: &dyn UpstreamTransport,
    candidates: &[String],
) -> FetchOutcome {
    let mut endpoints_tried = Vec::with_capacity(candidates.len());

    for (attempt, url) in candidates.iter().enumerate() {
        endpoints_tried.push(url.clone());

        match transport.get_json(url).await {
            Ok(data) => {
                info!(
                    event_name = "upstream.resolver.attempt",
                    attempt = attempt + 1,
                    url = %url,
                    outcome = "success",
                    shape = %describe_shape(&data),
                    "upstream candidate responded"
                );
                return FetchOutcome { data: Some(data), error: None, endpoints_tried };
            }
            Err(error) => {
                warn!(
                    event_name = "upstream.resolver.attempt",
                    attempt = attempt + 1,
                    url = %url,
                    outcome = "failure",
                    error = %error,
                    "upstream candidate failed"
                );
            }
        }
    }

    warn!(
        event_name = "upstream.resolver.exhausted",
        candidates = endpoints_tried.len(),
        "all upstream candidates failed"
    );
    FetchOutcome {
        data: None,
        error: Some(EXHAUSTED_CANDIDATES_MESSAGE.to_string()),
        endpoints_tried,
    }
}

/// One request against a single resource URL. A 404 is reported through
/// `not_found` rather than `error`.
pub async fn fetch_by_id(transport: &dyn UpstreamTransport, url: &str) -> DetailFetch {
    match transport.get_json(url).await {
        Ok(data) => {
            info!(
                event_name = "upstream.resolver.detail",
                url = %url,
                outcome = "success",
                shape = %describe_shape(&data),
                "upstream detail responded"
            );
            DetailFetch { data: Some(data), error: None, not_found: false }
        }
        Err(TransportError::Status(404)) => {
            info!(
                event_name = "upstream.resolver.detail",
                url = %url,
                outcome = "not_found",
                "upstream detail not found"
            );
            DetailFetch { data: None, error: None, not_found: true }
        }
        Err(error) => {
            warn!(
                event_name = "upstream.resolver.detail",
                url = %url,
                outcome = "failure",
                error = %error,
                "upstream detail failed"
            );
            DetailFetch { data: None, error: Some(error.to_string()), not_found: false }
        }
    }
}

/// Short structural excerpt of a payload for log lines.
pub fn describe_shape(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array(len={})", items.len()),
        Value::Object(map) => {
            let mut keys: Vec<&str> =
                map.keys().map(String::as_str).take(SHAPE_KEY_LIMIT).collect();
            if map.len() > SHAPE_KEY_LIMIT {
                keys.push("...");
            }
            format!("object(keys=[{}])", keys.join(","))
        }
    }
}
