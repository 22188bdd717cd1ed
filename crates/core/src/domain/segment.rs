use serde::{Deserialize, Serialize};

use crate::domain::customer::{Customer, CustomerId};
use crate::domain::metrics::CustomerSuccessMetrics;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Segment {
    Active,
    AtRisk,
    Vip,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Self::Active, Self::AtRisk, Self::Vip];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::AtRisk => "at-risk",
            Self::Vip => "vip",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "active" => Some(Self::Active),
            "at-risk" => Some(Self::AtRisk),
            "vip" => Some(Self::Vip),
            _ => None,
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSegmentationEntry {
    pub customer_id: CustomerId,
    pub segment: Segment,
}

/// A customer joined with everything the hub view derives for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerHubRow {
    pub customer: Customer,
    pub metrics: CustomerSuccessMetrics,
    pub segment: Segment,
    pub mrr: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationSummary {
    pub total_customers: usize,
    pub active: usize,
    pub at_risk: usize,
    pub vip: usize,
    pub average_health_score: u8,
    pub total_lifetime_value: u64,
}

impl SegmentationSummary {
    pub fn count_for(&self, segment: Segment) -> usize {
        match segment {
            Segment::Active => self.active,
            Segment::AtRisk => self.at_risk,
            Segment::Vip => self.vip,
        }
    }
}
