use std::env;
use std::sync::{mpsc, Mutex, OnceLock};
use std::thread;

use axum::routing::get;
use axum::{Json, Router};
use beacon_cli::commands::customers::CustomersArgs;
use beacon_cli::commands::{config, customers, doctor, segments};
use serde_json::{json, Value};

const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:9";

#[test]
fn config_reports_validation_failure_for_invalid_base_url() {
    with_env(&[("BEACON_UPSTREAM_BASE_URL", "owners.internal:9966")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_attributes_sources_and_redacts_token() {
    with_env(
        &[
            ("BEACON_UPSTREAM_BASE_URL", "http://owners.internal:9966"),
            ("BEACON_UPSTREAM_API_TOKEN", "tok_live_abcdef"),
            ("BEACON_LOG_LEVEL", "debug"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0);

            let output = result.output;
            assert!(output.contains(
                "- upstream.base_url = http://owners.internal:9966 (source: env (BEACON_UPSTREAM_BASE_URL))"
            ));
            assert!(output.contains("- upstream.api_token = tok_***"));
            assert!(!output.contains("abcdef"));
            assert!(output.contains("- server.port = 8090 (source: default)"));
            assert!(output.contains("- logging.level = debug (source: env (BEACON_LOG_LEVEL))"));
            assert!(output.contains("- interactions.anchor_date = <now> (source: default)"));
        },
    );
}

#[test]
fn customers_rejects_unknown_pets_bucket_before_contacting_upstream() {
    with_env(&[("BEACON_UPSTREAM_BASE_URL", UNREACHABLE_UPSTREAM)], || {
        let args = CustomersArgs { pets: Some("dozens".to_string()), ..CustomersArgs::default() };
        let result = customers::run(&args);
        assert_eq!(result.exit_code, 2, "expected invalid argument code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "customers");
        assert_eq!(payload["error_class"], "invalid_argument");
    });
}

#[test]
fn customers_rejects_unknown_sort_field() {
    with_env(&[], || {
        let args =
            CustomersArgs { sort: Some("favoriteColor".to_string()), ..CustomersArgs::default() };
        let result = customers::run(&args);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_argument");
    });
}

#[test]
fn customers_reports_unreachable_upstream() {
    with_env(
        &[
            ("BEACON_UPSTREAM_BASE_URL", UNREACHABLE_UPSTREAM),
            ("BEACON_UPSTREAM_TIMEOUT_SECS", "1"),
        ],
        || {
            let result = customers::run(&CustomersArgs::default());
            assert_eq!(result.exit_code, 4, "expected upstream failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "customers");
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "upstream_unavailable");
        },
    );
}

#[test]
fn segments_reports_unreachable_upstream() {
    with_env(
        &[
            ("BEACON_UPSTREAM_BASE_URL", UNREACHABLE_UPSTREAM),
            ("BEACON_UPSTREAM_TIMEOUT_SECS", "1"),
        ],
        || {
            let result = segments::run();
            assert_eq!(result.exit_code, 4);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "segments");
            assert_eq!(payload["error_class"], "upstream_unavailable");
        },
    );
}

#[test]
fn segments_returns_config_failure_for_invalid_timeout() {
    with_env(&[("BEACON_UPSTREAM_TIMEOUT_SECS", "0")], || {
        let result = segments::run();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_json_skips_dependent_checks_when_config_fails() {
    with_env(&[("BEACON_UPSTREAM_BASE_URL", "owners.internal:9966")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["name"], "upstream_endpoints");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn doctor_json_reports_upstream_probe_failure() {
    with_env(
        &[
            ("BEACON_UPSTREAM_BASE_URL", UNREACHABLE_UPSTREAM),
            ("BEACON_UPSTREAM_TIMEOUT_SECS", "1"),
            ("BEACON_INTERACTIONS_ANCHOR_DATE", "2024-01-15"),
        ],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 4);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["checks"][0]["status"], "pass");
            assert_eq!(payload["checks"][1]["status"], "fail");
            let details = payload["checks"][1]["details"].as_str().unwrap_or_default();
            assert!(details.contains("after trying 3 endpoint(s)"), "details: {details}");
            assert_eq!(payload["checks"][2]["status"], "pass");
            let anchor = payload["checks"][2]["details"].as_str().unwrap_or_default();
            assert!(anchor.contains("2024-01-15"));
        },
    );
}

#[test]
fn doctor_human_output_marks_failed_checks() {
    with_env(&[("BEACON_UPSTREAM_BASE_URL", "owners.internal:9966")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] upstream_endpoints:"));
    });
}

#[test]
fn customers_filters_and_sorts_live_owners() {
    let base_url = owner_registry();
    with_env(&[("BEACON_UPSTREAM_BASE_URL", base_url)], || {
        let args = CustomersArgs {
            city: Some("MADISON".to_string()),
            sort: Some("name:desc".to_string()),
            ..CustomersArgs::default()
        };
        let result = customers::run(&args);
        assert_eq!(result.exit_code, 0, "output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "customers");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "2 of 4 customers matched");

        let names: Vec<&str> = payload["data"]["customers"]
            .as_array()
            .map(|rows| rows.iter().filter_map(|row| row["name"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["Peter McTavish", "George Franklin"]);
        assert_eq!(payload["data"]["cities"], json!(["Madison", "McFarland", "Sun Prairie"]));
    });
}

#[test]
fn segments_summarizes_live_owners() {
    let base_url = owner_registry();
    with_env(&[("BEACON_UPSTREAM_BASE_URL", base_url)], || {
        let result = segments::run();
        assert_eq!(result.exit_code, 0, "output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "segments");
        assert_eq!(
            payload["message"],
            "4 customers: 1 vip, 2 active, 1 at-risk (average health 51)"
        );
        assert_eq!(payload["data"]["summary"]["totalCustomers"], 4);
        assert_eq!(payload["data"]["entries"][2], json!({ "customerId": "3", "segment": "vip" }));
    });
}

#[test]
fn doctor_passes_against_live_owners() {
    let base_url = owner_registry();
    with_env(&[("BEACON_UPSTREAM_BASE_URL", base_url)], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let details = payload["checks"][1]["details"].as_str().unwrap_or_default();
        assert!(details.contains("after 1 attempt(s)"), "details: {details}");
        assert!(details.contains("(4 owners)"), "details: {details}");
    });
}

fn owner_fixture() -> Value {
    json!({
        "_embedded": {
            "owners": [
                { "id": 1, "firstName": "George", "lastName": "Franklin", "city": "Madison",
                  "pets": [{ "id": 1, "name": "Leo" }] },
                { "id": 2, "firstName": "Betty", "lastName": "Davis", "city": "Sun Prairie",
                  "pets": [{ "id": 2, "name": "Basil" }] },
                { "id": 3, "firstName": "Eduardo", "lastName": "Rodriquez", "city": "McFarland",
                  "pets": [{ "id": 3, "name": "Rosy" }, { "id": 4, "name": "Jewel" }] },
                { "id": 5, "firstName": "Peter", "lastName": "McTavish", "city": "madison",
                  "pets": [{ "id": 6, "name": "George" }] }
            ]
        }
    })
}

/// Serves the owner fixture on a background thread for the life of the test binary.
fn owner_registry() -> &'static str {
    static BASE_URL: OnceLock<String> = OnceLock::new();
    BASE_URL.get_or_init(|| {
        let (address_tx, address_rx) = mpsc::channel();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub runtime should build");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
                address_tx.send(listener.local_addr().expect("stub address")).expect("send");
                let app = Router::new()
                    .route("/api/customer/owners", get(|| async { Json(owner_fixture()) }));
                let _ = axum::serve(listener, app).await;
            });
        });
        let address = address_rx.recv().expect("stub registry should start");
        format!("http://{address}")
    })
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BEACON_CONFIG_PATH",
        "BEACON_UPSTREAM_BASE_URL",
        "BEACON_UPSTREAM_CANDIDATE_PATHS",
        "BEACON_UPSTREAM_DETAIL_PATH",
        "BEACON_UPSTREAM_TIMEOUT_SECS",
        "BEACON_UPSTREAM_API_TOKEN",
        "BEACON_SERVER_BIND_ADDRESS",
        "BEACON_SERVER_PORT",
        "BEACON_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "BEACON_INTERACTIONS_ANCHOR_DATE",
        "BEACON_LOGGING_LEVEL",
        "BEACON_LOGGING_FORMAT",
        "BEACON_LOG_LEVEL",
        "BEACON_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
