use serde::{Deserialize, Serialize};

use crate::domain::segment::Segment;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetsBucket {
    #[default]
    All,
    None,
    Few,
    Many,
}

impl PetsBucket {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Some(Self::All),
            "none" => Some(Self::None),
            "few" => Some(Self::Few),
            "many" => Some(Self::Many),
            _ => None,
        }
    }

    pub fn matches(&self, pets_count: u32) -> bool {
        match self {
            Self::All => true,
            Self::None => pets_count == 0,
            Self::Few => (1..=2).contains(&pets_count),
            Self::Many => pets_count >= 3,
        }
    }
}

/// Health-score band, cut at the churn-risk thresholds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBucket {
    #[default]
    All,
    Healthy,
    Watch,
    Critical,
}

impl HealthBucket {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Some(Self::All),
            "healthy" => Some(Self::Healthy),
            "watch" => Some(Self::Watch),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn matches(&self, health_score: u8) -> bool {
        match self {
            Self::All => true,
            Self::Healthy => health_score >= 80,
            Self::Watch => (50..80).contains(&health_score),
            Self::Critical => health_score < 50,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MrrBucket {
    #[default]
    All,
    Starter,
    Growth,
    Enterprise,
}

impl MrrBucket {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Some(Self::All),
            "starter" => Some(Self::Starter),
            "growth" => Some(Self::Growth),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    pub fn matches(&self, mrr: u32) -> bool {
        match self {
            Self::All => true,
            Self::Starter => mrr < 1_000,
            Self::Growth => (1_000..3_000).contains(&mrr),
            Self::Enterprise => mrr >= 3_000,
        }
    }
}

/// Transient list-view filter state owned by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFilterState {
    pub search_query: String,
    pub city: Option<String>,
    pub pets_bucket: PetsBucket,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubFilterState {
    pub customer: CustomerFilterState,
    pub health: HealthBucket,
    pub mrr: MrrBucket,
    pub segment: Option<Segment>,
}

impl CustomerFilterState {
    /// Builds filter state from loosely typed request parameters.
    pub fn from_params(
        search: Option<&str>,
        city: Option<&str>,
        pets: Option<&str>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            search_query: search.unwrap_or_default().to_string(),
            city: city.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string),
            pets_bucket: parse_param("pets", pets, PetsBucket::parse)?,
        })
    }
}

impl HubFilterState {
    pub fn from_params(
        customer: CustomerFilterState,
        health: Option<&str>,
        mrr: Option<&str>,
        segment: Option<&str>,
    ) -> Result<Self, DomainError> {
        let segment = match segment.map(str::trim) {
            None | Some("") => None,
            Some(raw) if raw.eq_ignore_ascii_case("all") => None,
            Some(raw) => Some(Segment::parse(raw).ok_or_else(|| DomainError::InvalidFilter {
                field: "segment",
                value: raw.to_string(),
            })?),
        };

        Ok(Self {
            customer,
            health: parse_param("health", health, HealthBucket::parse)?,
            mrr: parse_param("mrr", mrr, MrrBucket::parse)?,
            segment,
        })
    }
}

fn parse_param<T: Default>(
    field: &'static str,
    raw: Option<&str>,
    parse: fn(&str) -> Option<T>,
) -> Result<T, DomainError> {
    match raw {
        Some(value) => parse(value)
            .ok_or_else(|| DomainError::InvalidFilter { field, value: value.to_string() }),
        None => Ok(T::default()),
    }
}
