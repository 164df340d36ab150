use anyhow::Result;
use tracing::{error, info, trace};

use super::{connect, print_json};
use crate::config::AppConfig;

pub async fn mappings(config: &AppConfig) -> Result<()> {
    trace!("Entering mappings function");

    let client = connect(config)?;
    let entries = match client.available_mappings().await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to fetch available mappings: {}", e);
            return Err(e.into());
        }
    };

    info!("{} vaccines with mapped supply records", entries.len());
    print_json(entries.as_ref())?;

    trace!("mappings function completed");
    Ok(())
}
