//! JSON API consumed by the presentation layer.
//!
//! List-style endpoints answer 200 and carry upstream failures in their
//! `error` field. Single-customer endpoints map failures onto status codes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use beacon_core::domain::customer::{Customer, CustomerDetail};
use beacon_core::domain::filter::{CustomerFilterState, HubFilterState};
use beacon_core::domain::metrics::{CustomerInteraction, CustomerSuccessMetrics};
use beacon_core::errors::{ApplicationError, DomainError, InterfaceError};
use beacon_core::filters::{
    distinct_cities, filter_customers, filter_hub_rows, sort_by_spec, SortSpec,
};
use beacon_core::metrics::{derive_metrics, monthly_recurring_revenue};
use beacon_upstream::{CustomerHubResult, CustomerSource, SegmentationResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    source: Arc<CustomerSource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub pets: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HubQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub pets: Option<String>,
    pub health: Option<String>,
    pub mrr: Option<String>,
    pub segment: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListResponse {
    pub customers: Vec<Customer>,
    pub cities: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMetricsResponse {
    pub customer_id: String,
    #[serde(flatten)]
    pub metrics: CustomerSuccessMetrics,
    pub mrr: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: String,
    pub message: &'static str,
    pub correlation_id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub fn router(source: Arc<CustomerSource>) -> Router {
    Router::new()
        .route("/api/customers", get(list_customers))
        .route("/api/customers/{id}", get(customer_detail))
        .route("/api/customers/{id}/metrics", get(customer_metrics))
        .route("/api/customers/{id}/interactions", get(customer_interactions))
        .route("/api/segmentation", get(segmentation))
        .route("/api/hub", get(customer_hub))
        .with_state(ApiState { source })
}

pub fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn reject(error: impl Into<ApplicationError>) -> (StatusCode, Json<ApiError>) {
    let interface = error.into().into_interface(Uuid::new_v4().to_string());
    let status = status_for(&interface);

    warn!(
        event_name = "api.request.rejected",
        correlation_id = %interface.correlation_id(),
        status = status.as_u16(),
        error = %interface,
        "request rejected"
    );

    (
        status,
        Json(ApiError {
            error: interface.to_string(),
            message: interface.user_message(),
            correlation_id: interface.correlation_id().to_string(),
        }),
    )
}

async fn list_customers(
    State(state): State<ApiState>,
    Query(query): Query<CustomerListQuery>,
) -> ApiResult<CustomerListResponse> {
    let filter = CustomerFilterState::from_params(
        query.q.as_deref(),
        query.city.as_deref(),
        query.pets.as_deref(),
    )
    .map_err(reject)?;
    let sort = parse_sort(query.sort.as_deref()).map_err(reject)?;

    let list = state.source.get_customers_from_source().await;
    let cities = distinct_cities(&list.customers);
    let customers = sort_by_spec(&filter_customers(&list.customers, &filter), &sort);

    info!(
        event_name = "api.customers.list",
        total = list.customers.len(),
        returned = customers.len(),
        upstream_error = list.error.is_some(),
        "customer list served"
    );
    Ok(Json(CustomerListResponse { customers, cities, error: list.error }))
}

async fn customer_detail(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
) -> ApiResult<CustomerDetail> {
    let id = parse_customer_id(&raw_id).map_err(reject)?;
    let result = state.source.get_customer_detail(id).await;

    if result.not_found {
        return Err(reject(ApplicationError::NotFound(id.to_string())));
    }
    if let Some(error) = result.error {
        return Err(reject(ApplicationError::Upstream(error)));
    }
    result.customer.map(Json).ok_or_else(|| reject(ApplicationError::NotFound(id.to_string())))
}

async fn customer_metrics(Path(raw_id): Path<String>) -> ApiResult<CustomerMetricsResponse> {
    let id = parse_customer_id(&raw_id).map_err(reject)?;
    let metrics = derive_metrics(id);

    Ok(Json(CustomerMetricsResponse {
        customer_id: id.to_string(),
        mrr: monthly_recurring_revenue(metrics.lifetime_value),
        metrics,
    }))
}

async fn customer_interactions(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Vec<CustomerInteraction>> {
    let id = parse_customer_id(&raw_id).map_err(reject)?;
    Ok(Json(state.source.get_interactions(id)))
}

async fn segmentation(State(state): State<ApiState>) -> Json<SegmentationResult> {
    Json(state.source.get_segmentation().await)
}

async fn customer_hub(
    State(state): State<ApiState>,
    Query(query): Query<HubQuery>,
) -> ApiResult<CustomerHubResult> {
    let customer = CustomerFilterState::from_params(
        query.q.as_deref(),
        query.city.as_deref(),
        query.pets.as_deref(),
    )
    .map_err(reject)?;
    let filter = HubFilterState::from_params(
        customer,
        query.health.as_deref(),
        query.mrr.as_deref(),
        query.segment.as_deref(),
    )
    .map_err(reject)?;
    let sort = parse_sort(query.sort.as_deref()).map_err(reject)?;

    let hub = state.source.get_customer_hub().await;
    let rows = sort_by_spec(&filter_hub_rows(&hub.rows, &filter), &sort);

    info!(
        event_name = "api.hub.list",
        total = hub.rows.len(),
        returned = rows.len(),
        upstream_error = hub.error.is_some(),
        "customer hub served"
    );
    Ok(Json(CustomerHubResult { rows, summary: hub.summary, error: hub.error }))
}

fn parse_customer_id(raw: &str) -> Result<i64, DomainError> {
    raw.trim().parse::<i64>().map_err(|_| DomainError::InvalidCustomerId(raw.to_string()))
}

fn parse_sort(raw: Option<&str>) -> Result<SortSpec, DomainError> {
    Ok(raw.map(SortSpec::parse).transpose()?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use beacon_core::config::AppConfig;
    use beacon_upstream::{CustomerSource, StaticTransport, TransportError};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::router;

    const OWNERS_URL: &str = "http://localhost:8080/api/customer/owners";

    fn owner(id: i64, first: &str, last: &str, city: &str, pets: usize) -> Value {
        let pets: Vec<Value> = (0..pets)
            .map(|n| {
                json!({
                    "id": id * 10 + n as i64,
                    "name": format!("pet-{n}"),
                    "type": { "id": 1, "name": "dog" }
                })
            })
            .collect();
        json!({ "id": id, "firstName": first, "lastName": last, "city": city, "pets": pets })
    }

    fn roster() -> Value {
        json!({
            "_embedded": {
                "owners": [
                    owner(1, "George", "Franklin", "Madison", 1),
                    owner(2, "Betty", "Davis", "Sun Prairie", 1),
                    owner(3, "Eduardo", "Rodriquez", "McFarland", 2),
                    owner(4, "Harold", "Davis", "Windsor", 1),
                    owner(5, "Peter", "McTavish", "Madison", 1),
                    owner(6, "Jean", "Coleman", "Monona", 2)
                ]
            }
        })
    }

    fn app(transport: StaticTransport) -> Router {
        let mut config = AppConfig::default();
        config.interactions.anchor_date = chrono::NaiveDate::from_ymd_opt(2026, 2, 1);
        router(Arc::new(CustomerSource::new(Arc::new(transport), &config)))
    }

    fn fixture() -> Router {
        app(StaticTransport::new()
            .with_json(OWNERS_URL, roster())
            .with_json(format!("{OWNERS_URL}/1"), owner(1, "George", "Franklin", "Madison", 1))
            .with_error(format!("{OWNERS_URL}/7"), TransportError::Status(500)))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, body)
    }

    fn ids(rows: &Value, pointer: &str) -> Vec<String> {
        rows.as_array()
            .expect("array")
            .iter()
            .map(|row| row.pointer(pointer).and_then(Value::as_str).unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn customer_list_filters_by_city_and_sorts() {
        let (status, body) = get(fixture(), "/api/customers?city=madison&sort=name:desc").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body["customers"], "/id"), vec!["5", "1"]);
        assert_eq!(
            body["cities"],
            json!(["Madison", "McFarland", "Monona", "Sun Prairie", "Windsor"])
        );
        assert_eq!(body["error"], Value::Null);
        assert_eq!(body["customers"][0]["createdFrom"], json!("petclinic"));
    }

    #[tokio::test]
    async fn customer_list_search_and_pets_bucket() {
        let (status, body) = get(fixture(), "/api/customers?q=DAVIS&pets=few").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body["customers"], "/id"), vec!["2", "4"]);
    }

    #[tokio::test]
    async fn customer_list_rejects_unknown_pets_bucket() {
        let (status, body) = get(fixture(), "/api/customers?pets=dozens").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or_default().contains("pets"));
        assert!(body["correlationId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn customer_list_rejects_unknown_sort_field() {
        let (status, _) = get(fixture(), "/api/customers?sort=shoeSize").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn customer_list_reports_upstream_failure_in_body() {
        let (status, body) = get(app(StaticTransport::new()), "/api/customers").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customers"], json!([]));
        assert_eq!(body["error"], json!("no upstream endpoint responded successfully"));
    }

    #[tokio::test]
    async fn customer_detail_status_mapping() {
        let (ok, detail) = get(fixture(), "/api/customers/1").await;
        assert_eq!(ok, StatusCode::OK);
        assert_eq!(detail["fullName"], json!("George Franklin"));
        assert_eq!(detail["telephone"], Value::Null);
        assert_eq!(detail["pets"][0]["type"], json!("dog"));

        let (missing, _) = get(fixture(), "/api/customers/42").await;
        assert_eq!(missing, StatusCode::NOT_FOUND);

        let (invalid, _) = get(fixture(), "/api/customers/abc").await;
        assert_eq!(invalid, StatusCode::BAD_REQUEST);

        let (failed, body) = get(fixture(), "/api/customers/7").await;
        assert_eq!(failed, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["message"],
            json!("Customer data is temporarily unavailable. Please retry shortly.")
        );
    }

    #[tokio::test]
    async fn customer_metrics_are_derived_from_id() {
        let (status, body) = get(fixture(), "/api/customers/5/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "customerId": "5",
                "healthScore": 84,
                "churnRisk": "low",
                "lifetimeValue": 16725,
                "stage": "expanding",
                "mrr": 1393
            })
        );
    }

    #[tokio::test]
    async fn customer_interactions_are_newest_first() {
        let (status, body) = get(fixture(), "/api/customers/3/interactions").await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().expect("array");
        assert!((4..=7).contains(&items.len()));
        let timestamps: Vec<&str> =
            items.iter().filter_map(|item| item["occurredAt"].as_str()).collect();
        assert!(timestamps.windows(2).all(|pair| pair[0] >= pair[1]));

        let (_, again) = get(fixture(), "/api/customers/3/interactions").await;
        assert_eq!(body, again);
    }

    #[tokio::test]
    async fn segmentation_lists_every_customer_with_summary() {
        let (status, body) = get(fixture(), "/api/segmentation").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"].as_array().map(Vec::len), Some(6));
        assert_eq!(body["summary"]["vip"], json!(2));
        assert_eq!(body["summary"]["atRisk"], json!(2));
        assert_eq!(body["summary"]["active"], json!(2));
        assert_eq!(body["entries"][2], json!({ "customerId": "3", "segment": "vip" }));
    }

    #[tokio::test]
    async fn hub_filters_by_segment_and_sorts_by_lifetime_value() {
        let (status, body) = get(fixture(), "/api/hub?segment=vip&sort=ltv:desc").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body["rows"], "/customer/id"), vec!["4", "3"]);
        assert_eq!(body["summary"]["totalCustomers"], json!(6));
    }

    #[tokio::test]
    async fn hub_rejects_unknown_segment() {
        let (status, _) = get(fixture(), "/api/hub?segment=gold").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
