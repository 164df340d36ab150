pub mod comparison;
pub mod legacy_forecast;
pub mod mappings;
pub mod normalize_supply;
pub mod snapshot;

pub use comparison::comparison;
pub use legacy_forecast::legacy_forecast;
pub use mappings::mappings;
pub use normalize_supply::normalize_supply;
pub use snapshot::snapshot;

use anyhow::{Context, Result};
use client::ApiClient;
use common::FilterState;
use serde::Serialize;
use tracing::{debug, error};
use validator::Validate;

use crate::config::AppConfig;

/// Client for the configured backend.
pub(crate) fn connect(config: &AppConfig) -> Result<ApiClient> {
    let base_url = config.base_url()?;
    debug!("Connecting to {} (timeout {:?})", base_url, config.request_timeout());
    ApiClient::connect(base_url, config.request_timeout())
        .with_context(|| format!("Cannot use backend at {}", base_url))
}

/// Rejects out-of-range filters before any request is made.
pub(crate) fn validate_filters(filters: &FilterState) -> Result<()> {
    filters.validate().map_err(|e| {
        error!("Invalid filters: {}", e);
        anyhow::anyhow!("Invalid filters: {}", e)
    })
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", rendered);
    Ok(())
}
