use beacon_core::domain::owner::RawOwnerRecord;
use serde_json::Value;
use tracing::{debug, warn};

/// Recognized list envelopes, probed in this order.
#[derive(Clone, Debug, PartialEq)]
pub enum UpstreamPayload {
    Array(Vec<Value>),
    EmbeddedOwners(Vec<Value>),
    EmbeddedOwnerList(Vec<Value>),
    Paginated(Vec<Value>),
    Unrecognized,
}

impl UpstreamPayload {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array(_) => "array",
            Self::EmbeddedOwners(_) => "embedded_owners",
            Self::EmbeddedOwnerList(_) => "embedded_owner_list",
            Self::Paginated(_) => "paginated",
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Array(records)
            | Self::EmbeddedOwners(records)
            | Self::EmbeddedOwnerList(records)
            | Self::Paginated(records) => records,
            Self::Unrecognized => Vec::new(),
        }
    }
}

pub fn classify_payload(payload: &Value) -> UpstreamPayload {
    if let Value::Array(records) = payload {
        return UpstreamPayload::Array(records.clone());
    }

    if let Some(records) = payload.pointer("/_embedded/owners").and_then(Value::as_array) {
        return UpstreamPayload::EmbeddedOwners(records.clone());
    }
    if let Some(records) = payload.pointer("/_embedded/ownerList").and_then(Value::as_array) {
        return UpstreamPayload::EmbeddedOwnerList(records.clone());
    }
    if let Some(records) = payload.get("content").and_then(Value::as_array) {
        return UpstreamPayload::Paginated(records.clone());
    }

    UpstreamPayload::Unrecognized
}

/// Owner records from any recognized list shape. Unrecognized payloads yield
/// an empty list; elements that do not parse as owners are skipped.
pub fn normalize_owners(payload: &Value) -> Vec<RawOwnerRecord> {
    let classified = classify_payload(payload);
    let shape = classified.as_str();
    if matches!(classified, UpstreamPayload::Unrecognized) {
        debug!(
            event_name = "upstream.normalizer.unrecognized",
            "payload did not match any known owner list shape"
        );
    }

    classified
        .into_records()
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<RawOwnerRecord>(record) {
            Ok(owner) => Some(owner),
            Err(error) => {
                warn!(
                    event_name = "upstream.normalizer.skipped_record",
                    shape,
                    index,
                    error = %error,
                    "skipping owner record that failed to parse"
                );
                None
            }
        })
        .collect()
}

/// A bare owner object (carrying both name fields) or a HAL `_embedded.owner`
/// wrapper. Anything else is treated as not found.
pub fn normalize_single_owner(payload: &Value) -> Option<RawOwnerRecord> {
    let candidate = if payload.get("firstName").is_some() && payload.get("lastName").is_some() {
        payload
    } else {
        payload.pointer("/_embedded/owner")?
    };

    match serde_json::from_value::<RawOwnerRecord>(candidate.clone()) {
        Ok(owner) => Some(owner),
        Err(error) => {
            warn!(
                event_name = "upstream.normalizer.skipped_record",
                shape = "single_owner",
                error = %error,
                "owner detail failed to parse"
            );
            None
        }
    }
}
