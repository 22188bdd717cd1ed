use beacon_core::config::{AppConfig, LoadOptions};
use beacon_upstream::{describe_shape, normalize_owners, CustomerSource};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG_FAILURE, EXIT_OK, EXIT_UPSTREAM_FAILURE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str) -> Self {
        Self {
            name,
            status: CheckStatus::Skipped,
            details: "skipped because configuration did not load".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let (report, exit_code) = build_report();

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> (DoctorReport, u8) {
    let mut checks = Vec::new();

    let exit_code = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass(
                "config_validation",
                "configuration loaded and validated",
            ));
            let upstream = check_upstream_endpoints(&config);
            let upstream_failed = upstream.status == CheckStatus::Fail;
            checks.push(upstream);
            checks.push(check_interaction_anchor(&config));
            if upstream_failed {
                EXIT_UPSTREAM_FAILURE
            } else {
                EXIT_OK
            }
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string()));
            checks.push(DoctorCheck::skipped("upstream_endpoints"));
            checks.push(DoctorCheck::skipped("interaction_anchor"));
            EXIT_CONFIG_FAILURE
        }
    };

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    (DoctorReport { overall_status, summary, checks }, exit_code)
}

fn check_upstream_endpoints(config: &AppConfig) -> DoctorCheck {
    const NAME: &str = "upstream_endpoints";

    let source = match CustomerSource::from_config(config) {
        Ok(source) => source,
        Err(error) => return DoctorCheck::fail(NAME, format!("client setup failed: {error}")),
    };
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck::fail(NAME, format!("failed to initialize async runtime: {error}"))
        }
    };

    let outcome = runtime.block_on(source.fetch_candidates());
    let tried = outcome.endpoints_tried.len();
    match (outcome.data, outcome.error) {
        (Some(payload), _) => {
            let responder = outcome.endpoints_tried.last().cloned().unwrap_or_default();
            let owners = normalize_owners(&payload).len();
            DoctorCheck::pass(
                NAME,
                format!(
                    "`{responder}` answered after {tried} attempt(s) with {} ({owners} owners)",
                    describe_shape(&payload)
                ),
            )
        }
        (None, error) => DoctorCheck::fail(
            NAME,
            format!(
                "{} after trying {tried} endpoint(s)",
                error.unwrap_or_else(|| "upstream probe failed".to_string())
            ),
        ),
    }
}

fn check_interaction_anchor(config: &AppConfig) -> DoctorCheck {
    let details = match config.interactions.anchor_date {
        Some(date) => format!("interaction timelines anchored at {date}"),
        None => "interaction timelines anchored at the current time".to_string(),
    };
    DoctorCheck::pass("interaction_anchor", details)
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
