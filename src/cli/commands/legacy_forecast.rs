use anyhow::Result;
use common::FilterState;
use tracing::{error, info, trace};

use super::{connect, print_json, validate_filters};
use crate::config::AppConfig;

pub async fn legacy_forecast(config: &AppConfig, filters: FilterState) -> Result<()> {
    trace!("Entering legacy_forecast function");
    validate_filters(&filters)?;

    let client = connect(config)?;
    let points = match client.legacy_forecast(&filters).await {
        Ok(points) => points,
        Err(e) => {
            error!("Failed to fetch legacy forecast: {}", e);
            return Err(e.into());
        }
    };

    info!("{} forecast points", points.len());
    print_json(&points)?;

    trace!("legacy_forecast function completed");
    Ok(())
}
