use anyhow::Result;
use common::FilterState;
use compute::ForecastOutcome;
use tracing::{debug, error, info, trace};

use super::{connect, print_json, validate_filters};
use crate::config::AppConfig;

pub async fn comparison(config: &AppConfig, filters: FilterState) -> Result<()> {
    trace!("Entering comparison function");
    validate_filters(&filters)?;

    let client = connect(config)?;
    let plan = client.reconciler().plan(&filters);
    debug!("Forecast plan: {:?}", plan);

    let outcome = match client.forecast(&plan).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Failed to fetch forecast: {}", e);
            return Err(e.into());
        }
    };

    match &outcome {
        ForecastOutcome::InsufficientData => info!("Not enough data to compare the selected years"),
        ForecastOutcome::ValidationError(message) => info!("Backend rejected the filters: {}", message),
        _ => debug!("Forecast outcome ready"),
    }
    print_json(&outcome)?;

    trace!("comparison function completed");
    Ok(())
}
