use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use beacon_core::config::{AppConfig, LoadOptions, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATHS};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG_FAILURE, EXIT_OK};

const COMMAND: &str = "config";

struct ConfigField {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

/// Prints effective values with their source. Output is plain text, not JSON.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                error.to_string(),
                EXIT_CONFIG_FAILURE,
            )
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in effective_fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }

    CommandResult { exit_code: EXIT_OK, output: lines.join("\n") }
}

fn effective_fields(config: &AppConfig) -> Vec<ConfigField> {
    let upstream = &config.upstream;
    let api_token = match upstream.api_token.as_ref() {
        Some(token) => redact_token(token.expose_secret()),
        None => "<unset>".to_string(),
    };
    let anchor_date = config
        .interactions
        .anchor_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "<now>".to_string());

    vec![
        ConfigField {
            key: "upstream.base_url",
            value: upstream.base_url.clone(),
            env_keys: &["BEACON_UPSTREAM_BASE_URL"],
        },
        ConfigField {
            key: "upstream.candidate_paths",
            value: upstream.candidate_paths.join(","),
            env_keys: &["BEACON_UPSTREAM_CANDIDATE_PATHS"],
        },
        ConfigField {
            key: "upstream.detail_path",
            value: upstream.detail_path.clone(),
            env_keys: &["BEACON_UPSTREAM_DETAIL_PATH"],
        },
        ConfigField {
            key: "upstream.timeout_secs",
            value: upstream.timeout_secs.to_string(),
            env_keys: &["BEACON_UPSTREAM_TIMEOUT_SECS"],
        },
        ConfigField {
            key: "upstream.api_token",
            value: api_token,
            env_keys: &["BEACON_UPSTREAM_API_TOKEN"],
        },
        ConfigField {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["BEACON_SERVER_BIND_ADDRESS"],
        },
        ConfigField {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["BEACON_SERVER_PORT"],
        },
        ConfigField {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["BEACON_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        ConfigField {
            key: "interactions.anchor_date",
            value: anchor_date,
            env_keys: &["BEACON_INTERACTIONS_ANCHOR_DATE"],
        },
        ConfigField {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["BEACON_LOGGING_LEVEL", "BEACON_LOG_LEVEL"],
        },
        ConfigField {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            env_keys: &["BEACON_LOGGING_FORMAT", "BEACON_LOG_FORMAT"],
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    let in_file = config_file_doc.is_some_and(|doc| contains_path(doc, key_path));
    if in_file {
        let file_path = config_file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    key_path.split('.').try_fold(root, |current, key| current.get(key)).is_some()
}

/// Keeps only the first four characters of long tokens.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    match trimmed.len() {
        0 => "<empty>".to_string(),
        1..=8 => "<redacted>".to_string(),
        _ => format!("{}***", trimmed.chars().take(4).collect::<String>()),
    }
}
