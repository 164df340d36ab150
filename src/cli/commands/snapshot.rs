use anyhow::Result;
use client::Dashboard;
use common::FilterState;
use tracing::{debug, info, trace, warn};

use super::{connect, print_json, validate_filters};
use crate::config::AppConfig;

pub async fn snapshot(config: &AppConfig, filters: FilterState) -> Result<()> {
    trace!("Entering snapshot function");
    validate_filters(&filters)?;
    debug!("Filters: {:?}", filters);

    let dashboard = Dashboard::new(connect(config)?);
    let summary = dashboard.refresh(filters).await;
    info!("Fetch cycle {} finished", summary.generation);

    let state = dashboard.snapshot().await;
    if let Some(banner) = &state.error_banner {
        warn!("{}", banner);
    }
    print_json(&state)?;

    trace!("snapshot function completed");
    Ok(())
}
