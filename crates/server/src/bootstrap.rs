use std::sync::Arc;

use beacon_core::config::{AppConfig, ConfigError};
use beacon_upstream::{CustomerSource, TransportError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub source: Arc<CustomerSource>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("upstream client setup failed: {0}")]
    Transport(#[source] TransportError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let source = CustomerSource::from_config(&config).map_err(BootstrapError::Transport)?;
    info!(
        event_name = "system.bootstrap.upstream_ready",
        correlation_id = "bootstrap",
        base_url = %config.upstream.base_url,
        candidates = source.candidate_urls().len(),
        "upstream customer source configured"
    );

    Ok(Application { config, source: Arc::new(source) })
}
