use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CANDIDATE_PATHS: [&str; 3] =
    ["/api/customer/owners", "/api/gateway/owners", "/api/owners"];
pub const DEFAULT_DETAIL_PATH: &str = "/api/customer/owners/{id}";
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["beacon.toml", "config/beacon.toml"];
pub const CONFIG_PATH_ENV: &str = "BEACON_CONFIG_PATH";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
    pub interactions: InteractionsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub candidate_paths: Vec<String>,
    pub detail_path: String,
    pub timeout_secs: u64,
    pub api_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

/// Pins the date interaction timestamps are generated relative to.
/// `None` means "today" at call time.
#[derive(Clone, Debug, Default)]
pub struct InteractionsConfig {
    pub anchor_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub upstream_base_url: Option<String>,
    pub upstream_timeout_secs: Option<u64>,
    pub server_port: Option<u16>,
    pub anchor_date: Option<NaiveDate>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Explicit file to load. Falls back to `BEACON_CONFIG_PATH`, then the default locations.
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig {
                base_url: "http://localhost:8080".to_string(),
                candidate_paths: DEFAULT_CANDIDATE_PATHS.iter().map(|p| p.to_string()).collect(),
                detail_path: DEFAULT_DETAIL_PATH.to_string(),
                timeout_secs: 10,
                api_token: None,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8090,
                graceful_shutdown_secs: 15,
            },
            interactions: InteractionsConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl UpstreamConfig {
    /// Candidate list URLs in the order they must be attempted.
    pub fn candidate_urls(&self) -> Vec<String> {
        self.candidate_paths.iter().map(|path| join_url(&self.base_url, path)).collect()
    }

    pub fn detail_url(&self, id: i64) -> String {
        join_url(&self.base_url, &self.detail_path.replace("{id}", &id.to_string()))
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim().trim_start_matches('/'))
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = resolve_config_path(options.config_path)? {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(upstream) = patch.upstream {
            if let Some(base_url) = upstream.base_url {
                self.upstream.base_url = base_url;
            }
            if let Some(candidate_paths) = upstream.candidate_paths {
                self.upstream.candidate_paths = candidate_paths;
            }
            if let Some(detail_path) = upstream.detail_path {
                self.upstream.detail_path = detail_path;
            }
            if let Some(timeout_secs) = upstream.timeout_secs {
                self.upstream.timeout_secs = timeout_secs;
            }
            if let Some(api_token) = upstream.api_token {
                self.upstream.api_token = Some(api_token.into());
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(interactions) = patch.interactions {
            if let Some(anchor_date) = interactions.anchor_date {
                self.interactions.anchor_date = Some(anchor_date);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BEACON_UPSTREAM_BASE_URL") {
            self.upstream.base_url = value;
        }
        if let Some(value) = read_env("BEACON_UPSTREAM_CANDIDATE_PATHS") {
            self.upstream.candidate_paths = value
                .split(',')
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = read_env("BEACON_UPSTREAM_DETAIL_PATH") {
            self.upstream.detail_path = value;
        }
        if let Some(value) = read_env("BEACON_UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = parse_u64("BEACON_UPSTREAM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("BEACON_UPSTREAM_API_TOKEN") {
            self.upstream.api_token = Some(value.into());
        }

        if let Some(value) = read_env("BEACON_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("BEACON_SERVER_PORT") {
            self.server.port = parse_u16("BEACON_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("BEACON_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("BEACON_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("BEACON_INTERACTIONS_ANCHOR_DATE") {
            self.interactions.anchor_date =
                Some(parse_date("BEACON_INTERACTIONS_ANCHOR_DATE", &value)?);
        }

        let log_level = read_env("BEACON_LOGGING_LEVEL").or_else(|| read_env("BEACON_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BEACON_LOGGING_FORMAT").or_else(|| read_env("BEACON_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.upstream_base_url {
            self.upstream.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.upstream_timeout_secs {
            self.upstream.timeout_secs = timeout_secs;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(anchor_date) = overrides.anchor_date {
            self.interactions.anchor_date = Some(anchor_date);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_upstream(&self.upstream)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// An explicitly named file must exist. The default locations are optional.
fn resolve_config_path(explicit_path: Option<PathBuf>) -> Result<Option<PathBuf>, ConfigError> {
    match explicit_path.or_else(|| read_env(CONFIG_PATH_ENV).map(PathBuf::from)) {
        Some(path) if path.exists() => Ok(Some(path)),
        Some(path) => Err(ConfigError::MissingConfigFile(path)),
        None => Ok(DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).find(|path| path.exists())),
    }
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_upstream(upstream: &UpstreamConfig) -> Result<(), ConfigError> {
    let base_url = upstream.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "upstream.base_url must start with http:// or https://".to_string(),
        ));
    }

    if upstream.candidate_paths.is_empty() {
        return Err(ConfigError::Validation(
            "upstream.candidate_paths must list at least one owners endpoint".to_string(),
        ));
    }
    if upstream.candidate_paths.iter().any(|path| path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "upstream.candidate_paths must not contain blank entries".to_string(),
        ));
    }

    if !upstream.detail_path.contains("{id}") {
        return Err(ConfigError::Validation(
            "upstream.detail_path must contain an `{id}` placeholder".to_string(),
        ));
    }

    if upstream.timeout_secs == 0 || upstream.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "upstream.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, ConfigError> {
    value.trim().parse::<NaiveDate>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    upstream: Option<UpstreamPatch>,
    server: Option<ServerPatch>,
    interactions: Option<InteractionsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct UpstreamPatch {
    base_url: Option<String>,
    candidate_paths: Option<Vec<String>>,
    detail_path: Option<String>,
    timeout_secs: Option<u64>,
    api_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct InteractionsPatch {
    anchor_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
