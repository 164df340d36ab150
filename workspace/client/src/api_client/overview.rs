use common::{FilterState, OverviewRecord};
use compute::{Endpoint, build_query, normalize};
use tracing::{info, instrument, trace};

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Headline totals for the filters.
    #[instrument(skip(self))]
    pub async fn overview(&self, filters: &FilterState) -> Result<OverviewRecord> {
        trace!("Fetching overview");
        let query = build_query(Endpoint::Overview, filters);
        let raw = self.get(Endpoint::Overview, &query).await?;
        let record: OverviewRecord = normalize(&raw);
        info!("Successfully fetched overview ({} doses)", record.total_doses);
        Ok(record)
    }
}
