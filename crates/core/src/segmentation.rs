//! Segment classification over derived metrics.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. `vip` when health >= 85, lifetime value >= 40000, or the customer has 3+ pets
//! 2. `at-risk` when health < 50
//! 3. `active` otherwise

use crate::domain::customer::Customer;
use crate::domain::segment::{
    CustomerHubRow, CustomerSegmentationEntry, Segment, SegmentationSummary,
};
use crate::metrics::{derive_metrics, monthly_recurring_revenue};

pub const VIP_HEALTH_SCORE: u8 = 85;
pub const VIP_LIFETIME_VALUE: u32 = 40_000;
pub const VIP_PETS_COUNT: u32 = 3;
pub const AT_RISK_HEALTH_SCORE: u8 = 50;

pub fn classify(customer: &Customer, health_score: u8, lifetime_value: u32) -> Segment {
    if health_score >= VIP_HEALTH_SCORE
        || lifetime_value >= VIP_LIFETIME_VALUE
        || customer.pets_count >= VIP_PETS_COUNT
    {
        Segment::Vip
    } else if health_score < AT_RISK_HEALTH_SCORE {
        Segment::AtRisk
    } else {
        Segment::Active
    }
}

/// Seed used for metric derivation. Ids that are not numeric fall back to 0.
pub fn metrics_seed(customer: &Customer) -> i64 {
    customer.id.numeric().unwrap_or(0)
}

pub fn classify_segmentation(customers: &[Customer]) -> Vec<CustomerSegmentationEntry> {
    customers
        .iter()
        .map(|customer| {
            let metrics = derive_metrics(metrics_seed(customer));
            CustomerSegmentationEntry {
                customer_id: customer.id.clone(),
                segment: classify(customer, metrics.health_score, metrics.lifetime_value),
            }
        })
        .collect()
}

pub fn build_hub_rows(customers: &[Customer]) -> Vec<CustomerHubRow> {
    customers
        .iter()
        .map(|customer| {
            let metrics = derive_metrics(metrics_seed(customer));
            CustomerHubRow {
                customer: customer.clone(),
                segment: classify(customer, metrics.health_score, metrics.lifetime_value),
                mrr: monthly_recurring_revenue(metrics.lifetime_value),
                metrics,
            }
        })
        .collect()
}

pub fn summarize(rows: &[CustomerHubRow]) -> SegmentationSummary {
    let mut summary = SegmentationSummary { total_customers: rows.len(), ..Default::default() };
    let mut health_total: u64 = 0;

    for row in rows {
        match row.segment {
            Segment::Active => summary.active += 1,
            Segment::AtRisk => summary.at_risk += 1,
            Segment::Vip => summary.vip += 1,
        }
        health_total += u64::from(row.metrics.health_score);
        summary.total_lifetime_value += u64::from(row.metrics.lifetime_value);
    }

    if !rows.is_empty() {
        summary.average_health_score = (health_total / rows.len() as u64) as u8;
    }
    summary
}
