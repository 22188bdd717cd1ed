//! Filter and sort pipeline over customer collections.
//!
//! Every function takes a borrowed slice and returns a fresh vector; inputs are
//! never reordered or mutated. Sorting is stable so equal rows keep input order.

use std::cmp::Ordering;
use std::collections::HashSet;

use thiserror::Error;

use crate::domain::customer::Customer;
use crate::domain::filter::{CustomerFilterState, HubFilterState, PetsBucket};
use crate::domain::segment::CustomerHubRow;
use crate::metrics::{derive_metrics, monthly_recurring_revenue};
use crate::segmentation::metrics_seed;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SortSpecError {
    #[error("unknown sort field `{0}`")]
    UnknownField(String),
    #[error("unknown sort direction `{0}` (expected asc|desc)")]
    UnknownDirection(String),
}

pub fn matches_search(customer: &Customer, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    [
        Some(customer.name.as_str()),
        customer.city.as_deref(),
        customer.address.as_deref(),
        customer.phone.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

pub fn matches_city(customer: &Customer, city: Option<&str>) -> bool {
    let Some(wanted) = city.map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };
    let wanted = wanted.to_lowercase();
    customer.city.as_deref().is_some_and(|value| value.trim().to_lowercase() == wanted)
}

pub fn matches_filter_state(customer: &Customer, state: &CustomerFilterState) -> bool {
    matches_search(customer, &state.search_query)
        && matches_city(customer, state.city.as_deref())
        && state.pets_bucket.matches(customer.pets_count)
}

pub fn search(customers: &[Customer], query: &str) -> Vec<Customer> {
    customers.iter().filter(|customer| matches_search(customer, query)).cloned().collect()
}

pub fn filter_by_city(customers: &[Customer], city: Option<&str>) -> Vec<Customer> {
    customers.iter().filter(|customer| matches_city(customer, city)).cloned().collect()
}

pub fn filter_by_pets_bucket(customers: &[Customer], bucket: PetsBucket) -> Vec<Customer> {
    customers.iter().filter(|customer| bucket.matches(customer.pets_count)).cloned().collect()
}

pub fn filter_customers(customers: &[Customer], state: &CustomerFilterState) -> Vec<Customer> {
    customers.iter().filter(|customer| matches_filter_state(customer, state)).cloned().collect()
}

pub fn filter_hub_rows(rows: &[CustomerHubRow], state: &HubFilterState) -> Vec<CustomerHubRow> {
    rows.iter()
        .filter(|row| {
            matches_filter_state(&row.customer, &state.customer)
                && state.health.matches(row.metrics.health_score)
                && state.mrr.matches(row.mrr)
                && state.segment.map(|segment| segment == row.segment).unwrap_or(true)
        })
        .cloned()
        .collect()
}

/// Distinct non-blank cities, case-insensitively deduplicated, sorted.
pub fn distinct_cities(customers: &[Customer]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cities: Vec<String> = Vec::new();
    for city in customers.iter().filter_map(|customer| customer.city.as_deref()) {
        let city = city.trim();
        if city.is_empty() || !seen.insert(city.to_lowercase()) {
            continue;
        }
        cities.push(city.to_string());
    }
    cities.sort_by_cached_key(|city| city.to_lowercase());
    cities
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Name,
    City,
    PetsCount,
    CreatedAt,
    HealthScore,
    LifetimeValue,
    Mrr,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "name" => Some(Self::Name),
            "city" => Some(Self::City),
            "pets" | "petscount" => Some(Self::PetsCount),
            "createdat" => Some(Self::CreatedAt),
            "health" | "healthscore" => Some(Self::HealthScore),
            "ltv" | "lifetimevalue" => Some(Self::LifetimeValue),
            "mrr" => Some(Self::Mrr),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(field: SortField) -> Self {
        Self { field, direction: SortDirection::Ascending }
    }

    pub fn descending(field: SortField) -> Self {
        Self { field, direction: SortDirection::Descending }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// Parses `field[:asc|desc]` pairs separated by commas, e.g. `city,createdAt:desc`.
    pub fn parse(raw: &str) -> Result<Self, SortSpecError> {
        let mut keys = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let (field, direction) = part.split_once(':').unwrap_or((part, "asc"));
            let field = SortField::parse(field)
                .ok_or_else(|| SortSpecError::UnknownField(field.trim().to_string()))?;
            let direction = match direction.trim().to_ascii_lowercase().as_str() {
                "asc" | "" => SortDirection::Ascending,
                "desc" => SortDirection::Descending,
                other => return Err(SortSpecError::UnknownDirection(other.to_string())),
            };
            keys.push(SortKey { field, direction });
        }
        Ok(Self { keys })
    }

    pub fn compare<T: Sortable>(&self, left: &T, right: &T) -> Ordering {
        self.keys.iter().fold(Ordering::Equal, |ordering, key| {
            ordering.then_with(|| {
                let by_field = left.compare_field(right, key.field);
                match key.direction {
                    SortDirection::Ascending => by_field,
                    SortDirection::Descending => by_field.reverse(),
                }
            })
        })
    }
}

pub trait Sortable {
    fn compare_field(&self, other: &Self, field: SortField) -> Ordering;
}

impl Sortable for Customer {
    fn compare_field(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::Name => compare_text(Some(&self.name), Some(&other.name)),
            SortField::City => compare_text(self.city.as_deref(), other.city.as_deref()),
            SortField::PetsCount => self.pets_count.cmp(&other.pets_count),
            SortField::CreatedAt => self.created_at.cmp(&other.created_at),
            SortField::HealthScore | SortField::LifetimeValue | SortField::Mrr => {
                let mine = derive_metrics(metrics_seed(self));
                let theirs = derive_metrics(metrics_seed(other));
                match field {
                    SortField::HealthScore => mine.health_score.cmp(&theirs.health_score),
                    SortField::LifetimeValue => mine.lifetime_value.cmp(&theirs.lifetime_value),
                    _ => monthly_recurring_revenue(mine.lifetime_value)
                        .cmp(&monthly_recurring_revenue(theirs.lifetime_value)),
                }
            }
        }
    }
}

impl Sortable for CustomerHubRow {
    fn compare_field(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::HealthScore => self.metrics.health_score.cmp(&other.metrics.health_score),
            SortField::LifetimeValue => {
                self.metrics.lifetime_value.cmp(&other.metrics.lifetime_value)
            }
            SortField::Mrr => self.mrr.cmp(&other.mrr),
            _ => self.customer.compare_field(&other.customer, field),
        }
    }
}

/// Stable sort into a new vector.
pub fn sort_by_spec<T: Sortable + Clone>(items: &[T], spec: &SortSpec) -> Vec<T> {
    let mut sorted = items.to_vec();
    if !spec.keys.is_empty() {
        sorted.sort_by(|left, right| spec.compare(left, right));
    }
    sorted
}

/// Case-insensitive text ordering; missing values sort after present ones.
fn compare_text(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.to_lowercase().cmp(&right.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
