use std::sync::Arc;

use common::MappingEntry;
use compute::{Endpoint, QueryParams, normalize};
use tracing::{debug, info};

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Vaccines with mapped supply records. Cached for five minutes.
    pub async fn available_mappings(&self) -> Result<Arc<Vec<MappingEntry>>> {
        if let Some(cached) = self.mappings_cache.get(&Endpoint::Mappings).await {
            debug!("Available mappings served from cache");
            return Ok(cached);
        }

        let raw = self.get(Endpoint::Mappings, &QueryParams::default()).await?;
        let entries: Arc<Vec<MappingEntry>> = Arc::new(normalize(&raw));
        info!("Successfully fetched {} available mappings", entries.len());
        self.mappings_cache
            .insert(Endpoint::Mappings, Arc::clone(&entries))
            .await;
        Ok(entries)
    }
}
