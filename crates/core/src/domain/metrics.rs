use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnRisk {
    Low,
    Medium,
    High,
}

impl ChurnRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomerStage {
    Onboarding,
    Active,
    Expanding,
    AtRisk,
}

impl CustomerStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Active => "active",
            Self::Expanding => "expanding",
            Self::AtRisk => "at-risk",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSuccessMetrics {
    pub health_score: u8,
    pub churn_risk: ChurnRisk,
    pub lifetime_value: u32,
    pub stage: CustomerStage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionChannel {
    Email,
    Call,
    Meeting,
    Qbr,
    Ticket,
    Note,
}

impl InteractionChannel {
    /// Draw order used by the interaction generator. Never reorder.
    pub const ALL: [InteractionChannel; 6] =
        [Self::Email, Self::Call, Self::Meeting, Self::Qbr, Self::Ticket, Self::Note];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Call => "call",
            Self::Meeting => "meeting",
            Self::Qbr => "qbr",
            Self::Ticket => "ticket",
            Self::Note => "note",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInteraction {
    pub id: String,
    pub customer_id: String,
    pub occurred_at: DateTime<Utc>,
    pub channel: InteractionChannel,
    pub title: String,
    pub description: Option<String>,
    pub owner: Option<String>,
}
