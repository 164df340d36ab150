use std::path::Path;

use anyhow::{Context, Result};
use compute::supply::SupplyNormalizer;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::print_json;

#[derive(Debug, Serialize)]
struct NormalizedName<'a> {
    raw: &'a str,
    normalized: Option<String>,
}

pub fn normalize_supply(mappings: Option<&Path>, names: &[String]) -> Result<()> {
    trace!("Entering normalize_supply function");

    let normalizer = match mappings {
        Some(path) => {
            debug!("Loading supply mappings from {}", path.display());
            SupplyNormalizer::load(path)
                .with_context(|| format!("Failed to load mappings from {}", path.display()))?
        }
        None => {
            warn!("No mapping file configured, only built-in fallbacks apply");
            SupplyNormalizer::default()
        }
    };
    info!("{} supply mappings loaded", normalizer.len());

    let results: Vec<NormalizedName> = names
        .iter()
        .map(|raw| NormalizedName {
            raw,
            normalized: normalizer.normalize(raw),
        })
        .collect();
    print_json(&results)?;

    trace!("normalize_supply function completed");
    Ok(())
}
