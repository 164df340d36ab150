use common::{FilterState, RankingEntry};
use compute::{Endpoint, build_query, normalize};
use tracing::{info, instrument, trace};

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Doses per state.
    #[instrument(skip(self))]
    pub async fn ranking(&self, filters: &FilterState) -> Result<Vec<RankingEntry>> {
        trace!("Fetching state ranking");
        let query = build_query(Endpoint::Ranking, filters);
        let raw = self.get(Endpoint::Ranking, &query).await?;
        let entries: Vec<RankingEntry> = normalize(&raw);
        info!("Successfully fetched ranking for {} states", entries.len());
        Ok(entries)
    }
}
