use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance tag stamped on every customer adapted from the owner registry.
pub const PETCLINIC_SOURCE: &str = "petclinic";

/// Placeholder used when an upstream pet carries no type.
pub const UNKNOWN_PET_TYPE: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    /// Numeric form of the id, when the id came from the owner registry.
    pub fn numeric(&self) -> Option<i64> {
        self.0.trim().parse::<i64>().ok()
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// List-view customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub pets_count: u32,
    pub email: Option<String>,
    pub created_from: String,
    pub created_at: DateTime<Utc>,
}

/// Detail-view customer. Absent contact fields serialize as `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    pub id: i64,
    pub full_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub telephone: Option<String>,
    pub pets: Vec<Pet>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<String>,
    #[serde(rename = "type")]
    pub pet_type: String,
}
