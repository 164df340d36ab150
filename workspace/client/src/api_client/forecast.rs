use common::{ComparisonPayload, FilterState, ForecastPoint};
use compute::forecast::legacy::{legacy_query, legacy_series};
use compute::{Endpoint, ForecastOutcome, ForecastPlan, normalize};
use tracing::{debug, info, instrument, trace};

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Runs the forecast side of a fetch cycle for an already chosen plan.
    ///
    /// Comparison failures never surface as errors: a 400 becomes a validation
    /// message and anything else becomes insufficient data. Failures of the
    /// plain forecast series are returned to the caller.
    #[instrument(skip(self))]
    pub async fn forecast(&self, plan: &ForecastPlan) -> Result<ForecastOutcome> {
        let Some((endpoint, query)) = plan.request() else {
            trace!("No filter selected, forecast stays empty");
            return Ok(ForecastOutcome::Empty);
        };

        if endpoint == Endpoint::Comparison {
            let outcome = match self.get(endpoint, &query).await {
                Ok(raw) => {
                    let payload: ComparisonPayload = normalize(&raw);
                    self.reconciler.reconcile_comparison(plan, payload)
                }
                Err(e) => self.reconciler.reconcile_failure(e.status(), &e.body()),
            };
            return Ok(outcome);
        }

        let raw = self.get(endpoint, &query).await?;
        let outcome = self.reconciler.reconcile_series(raw);
        info!("Successfully fetched {} forecast points", outcome.series().len());
        Ok(outcome)
    }

    /// Plans and runs the forecast for a filter combination.
    pub async fn forecast_for(&self, filters: &FilterState) -> Result<ForecastOutcome> {
        let plan = self.reconciler.plan(filters);
        debug!(?plan, "Forecast plan selected");
        self.forecast(&plan).await
    }

    /// Yearly history and projection for a single vaccine from the legacy endpoint.
    ///
    /// A 404 means the backend found no data and yields an empty series.
    #[instrument(skip(self))]
    pub async fn legacy_forecast(&self, filters: &FilterState) -> Result<Vec<ForecastPoint>> {
        let query = legacy_query(filters)?;
        match self.get(Endpoint::LegacyForecast, &query).await {
            Ok(raw) => {
                let points = legacy_series(&raw, self.reconciler.projection_year());
                info!("Successfully fetched {} legacy forecast points", points.len());
                Ok(points)
            }
            Err(e) if e.status() == Some(404) => {
                info!("Legacy forecast has no data for the filters");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
