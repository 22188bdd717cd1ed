use std::collections::HashSet;
use std::sync::Arc;

use beacon_core::adapter::{map_owner_to_customer, map_owner_to_customer_detail};
use beacon_core::config::{AppConfig, UpstreamConfig};
use beacon_core::domain::customer::{Customer, CustomerDetail};
use beacon_core::domain::metrics::CustomerInteraction;
use beacon_core::domain::segment::{
    CustomerHubRow, CustomerSegmentationEntry, SegmentationSummary,
};
use beacon_core::metrics::generate_interactions;
use beacon_core::segmentation::{build_hub_rows, classify_segmentation, summarize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::normalizer::{normalize_owners, normalize_single_owner};
use crate::resolver::{fetch_by_id, fetch_candidates, FetchOutcome};
use crate::transport::{HttpTransport, TransportError, UpstreamTransport};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListResult {
    pub customers: Vec<Customer>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetailResult {
    pub customer: Option<CustomerDetail>,
    pub error: Option<String>,
    pub not_found: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerHubResult {
    pub rows: Vec<CustomerHubRow>,
    pub summary: SegmentationSummary,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationResult {
    pub entries: Vec<CustomerSegmentationEntry>,
    pub summary: SegmentationSummary,
    pub error: Option<String>,
}

/// Read-only facade over the upstream owner registry.
pub struct CustomerSource {
    transport: Arc<dyn UpstreamTransport>,
    upstream: UpstreamConfig,
    candidates: Vec<String>,
    anchor_date: Option<NaiveDate>,
}

impl CustomerSource {
    pub fn new(transport: Arc<dyn UpstreamTransport>, config: &AppConfig) -> Self {
        Self {
            transport,
            candidates: config.upstream.candidate_urls(),
            upstream: config.upstream.clone(),
            anchor_date: config.interactions.anchor_date,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.upstream)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn candidate_urls(&self) -> &[String] {
        &self.candidates
    }

    pub async fn fetch_candidates(&self) -> FetchOutcome {
        fetch_candidates(self.transport.as_ref(), &self.candidates).await
    }

    pub async fn get_customers_from_source(&self) -> CustomerListResult {
        let outcome = self.fetch_candidates().await;
        let Some(payload) = outcome.data else {
            return CustomerListResult { customers: Vec::new(), error: outcome.error };
        };

        let mut seen = HashSet::new();
        let customers: Vec<Customer> = normalize_owners(&payload)
            .iter()
            .filter(|owner| {
                let first = seen.insert(owner.id);
                if !first {
                    warn!(
                        event_name = "upstream.source.duplicate_owner",
                        owner_id = owner.id,
                        "dropping duplicate owner id from batch"
                    );
                }
                first
            })
            .map(map_owner_to_customer)
            .collect();

        info!(
            event_name = "upstream.source.customers_loaded",
            count = customers.len(),
            endpoint = outcome.endpoints_tried.last().map(String::as_str).unwrap_or_default(),
            "customers loaded from upstream"
        );
        CustomerListResult { customers, error: None }
    }

    pub async fn get_customer_detail(&self, id: i64) -> CustomerDetailResult {
        let fetched = fetch_by_id(self.transport.as_ref(), &self.upstream.detail_url(id)).await;
        if fetched.not_found {
            return CustomerDetailResult { customer: None, error: None, not_found: true };
        }

        let Some(payload) = fetched.data else {
            return CustomerDetailResult { customer: None, error: fetched.error, not_found: false };
        };

        match normalize_single_owner(&payload) {
            Some(owner) => CustomerDetailResult {
                customer: Some(map_owner_to_customer_detail(&owner)),
                error: None,
                not_found: false,
            },
            None => CustomerDetailResult { customer: None, error: None, not_found: true },
        }
    }

    pub async fn get_customer_hub(&self) -> CustomerHubResult {
        let list = self.get_customers_from_source().await;
        let rows = build_hub_rows(&list.customers);
        let summary = summarize(&rows);
        CustomerHubResult { rows, summary, error: list.error }
    }

    pub async fn get_segmentation(&self) -> SegmentationResult {
        let list = self.get_customers_from_source().await;
        let entries = classify_segmentation(&list.customers);
        let summary = summarize(&build_hub_rows(&list.customers));
        SegmentationResult { entries, summary, error: list.error }
    }

    pub fn get_interactions(&self, customer_id: i64) -> Vec<CustomerInteraction> {
        generate_interactions(customer_id, self.interaction_anchor())
    }

    /// Configured anchor date at midnight UTC, or the current instant when unset.
    pub fn interaction_anchor(&self) -> DateTime<Utc> {
        match self.anchor_date {
            Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
            None => Utc::now(),
        }
    }
}
