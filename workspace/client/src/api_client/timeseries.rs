use common::{FilterState, TimeseriesPoint};
use compute::{Endpoint, build_query, normalize};
use tracing::{info, instrument, trace};

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Distribution time series, in backend order.
    #[instrument(skip(self))]
    pub async fn timeseries(&self, filters: &FilterState) -> Result<Vec<TimeseriesPoint>> {
        trace!("Fetching timeseries");
        let query = build_query(Endpoint::Timeseries, filters);
        let raw = self.get(Endpoint::Timeseries, &query).await?;
        let points: Vec<TimeseriesPoint> = normalize(&raw);
        info!("Successfully fetched {} timeseries points", points.len());
        Ok(points)
    }
}
