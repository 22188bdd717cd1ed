//! Deterministic success metrics and interaction history.
//!
//! Every value here is a pure function of the customer id (plus an explicit
//! anchor date for interaction timestamps). No platform RNG and no clock reads.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::domain::metrics::{
    ChurnRisk, CustomerInteraction, CustomerStage, CustomerSuccessMetrics, InteractionChannel,
};

pub const MIN_HEALTH_SCORE: u8 = 10;
pub const MAX_HEALTH_SCORE: u8 = 95;
pub const LIFETIME_VALUE_FLOOR: u32 = 5_000;
pub const LIFETIME_VALUE_SPAN: u32 = 50_000;

const LCG_MODULUS: i64 = 2_147_483_647;
const LCG_MULTIPLIER: i64 = 16_807;

/// 2022-01-01T00:00:00Z
const CREATED_AT_EPOCH_SECS: i64 = 1_640_995_200;
const CREATED_AT_SPREAD_DAYS: i64 = 730;

const MIN_INTERACTIONS: usize = 4;
const INTERACTION_COUNT_SPREAD: f64 = 4.0;
const INTERACTION_LOOKBACK_DAYS: f64 = 120.0;
const DESCRIPTION_THRESHOLD: f64 = 0.35;

const OWNERS: [&str; 4] = ["Avery Chen", "Jordan Patel", "Morgan Reyes", "Riley Brooks"];

pub fn derive_metrics(customer_id: i64) -> CustomerSuccessMetrics {
    let health_score = health_score(customer_id);
    CustomerSuccessMetrics {
        health_score,
        churn_risk: churn_risk(health_score),
        lifetime_value: lifetime_value(customer_id),
        stage: stage(health_score),
    }
}

pub fn health_score(customer_id: i64) -> u8 {
    let base = (i128::from(customer_id) * 37).rem_euclid(101) as u8;
    base.clamp(MIN_HEALTH_SCORE, MAX_HEALTH_SCORE)
}

pub fn lifetime_value(customer_id: i64) -> u32 {
    let spread = (i128::from(customer_id) * 12_345).rem_euclid(i128::from(LIFETIME_VALUE_SPAN));
    LIFETIME_VALUE_FLOOR + spread as u32
}

pub fn churn_risk(health_score: u8) -> ChurnRisk {
    if health_score >= 80 {
        ChurnRisk::Low
    } else if health_score >= 50 {
        ChurnRisk::Medium
    } else {
        ChurnRisk::High
    }
}

/// Stage cut points are independent of the churn-risk cut points.
pub fn stage(health_score: u8) -> CustomerStage {
    if health_score < 30 {
        CustomerStage::Onboarding
    } else if health_score < 60 {
        CustomerStage::Active
    } else if health_score < 85 {
        CustomerStage::Expanding
    } else {
        CustomerStage::AtRisk
    }
}

pub fn monthly_recurring_revenue(lifetime_value: u32) -> u32 {
    lifetime_value / 12
}

pub fn derive_created_at(customer_id: i64) -> DateTime<Utc> {
    let days = (i128::from(customer_id) * 53).rem_euclid(i128::from(CREATED_AT_SPREAD_DAYS)) as i64;
    DateTime::from_timestamp(CREATED_AT_EPOCH_SECS + days * 86_400, 0).unwrap_or_default()
}

/// Park-Miller minimal standard generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParkMillerLcg {
    value: i64,
}

impl ParkMillerLcg {
    pub fn new(seed: i64) -> Self {
        let mut value = seed % LCG_MODULUS;
        if value <= 0 {
            value += LCG_MODULUS - 1;
        }
        Self { value }
    }

    /// Float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.value = self.value * LCG_MULTIPLIER % LCG_MODULUS;
        (self.value - 1) as f64 / (LCG_MODULUS - 1) as f64
    }

    /// Index in [0, len). `len` must be non-zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64).floor() as usize).min(len.saturating_sub(1))
    }
}

pub fn generate_interactions(customer_id: i64, anchor: DateTime<Utc>) -> Vec<CustomerInteraction> {
    let mut rng = ParkMillerLcg::new(customer_id);
    let day_start = anchor.date_naive().and_time(NaiveTime::MIN).and_utc();
    let count = MIN_INTERACTIONS + (rng.next_f64() * INTERACTION_COUNT_SPREAD).floor() as usize;

    let mut interactions = Vec::with_capacity(count);
    for n in 0..count {
        let channel = InteractionChannel::ALL[rng.next_index(InteractionChannel::ALL.len())];
        let days_ago = (rng.next_f64() * INTERACTION_LOOKBACK_DAYS).floor() as i64;
        let hour = 8 + (rng.next_f64() * 10.0).floor() as i64;
        let titles = titles_for(channel);
        let title = titles[rng.next_index(titles.len())];
        let owner = OWNERS[rng.next_index(OWNERS.len())];
        let description = (rng.next_f64() >= DESCRIPTION_THRESHOLD)
            .then(|| format!("{title} logged by {owner} over {}.", channel.as_str()));

        interactions.push(CustomerInteraction {
            id: format!("{customer_id}-int-{n}"),
            customer_id: customer_id.to_string(),
            occurred_at: day_start - Duration::days(days_ago) + Duration::hours(hour),
            channel,
            title: title.to_string(),
            description,
            owner: Some(owner.to_string()),
        });
    }

    interactions.sort_by(|left, right| right.occurred_at.cmp(&left.occurred_at));
    interactions
}

fn titles_for(channel: InteractionChannel) -> [&'static str; 3] {
    match channel {
        InteractionChannel::Email => {
            ["Renewal check-in email", "Sent onboarding resources", "Follow-up on open questions"]
        }
        InteractionChannel::Call => {
            ["Quarterly health call", "Escalation call", "Adoption review call"]
        }
        InteractionChannel::Meeting => {
            ["Roadmap walkthrough", "Stakeholder alignment meeting", "Training session"]
        }
        InteractionChannel::Qbr => {
            ["Quarterly business review", "Executive QBR", "QBR preparation sync"]
        }
        InteractionChannel::Ticket => {
            ["Billing question resolved", "Access issue ticket", "Data import ticket"]
        }
        InteractionChannel::Note => {
            ["Account note", "Champion change noted", "Expansion signal noted"]
        }
    }
}
