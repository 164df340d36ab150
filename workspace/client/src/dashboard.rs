//! Dashboard fetch cycles.
//!
//! A [`Dashboard`] owns the view state and turns each filter change into one
//! fetch cycle. The four sub-fetches of a cycle run concurrently and each one
//! writes its own piece of state when it resolves, unless a newer cycle has
//! started in the meantime.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{FilterState, OverviewRecord, RankingEntry, TimeseriesPoint};
use compute::ForecastOutcome;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::api_client::ApiClient;
use crate::error::ClientError;
use crate::generation::{FetchGeneration, FetchToken};

/// Banner shown for any technical failure of a sub-fetch.
pub const LOAD_ERROR_MESSAGE: &str = "Falha ao carregar dados. Verifique o backend.";

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    /// Cycle that last wrote this state.
    pub generation: u64,
    pub filters: FilterState,
    pub overview: OverviewRecord,
    pub timeseries: Vec<TimeseriesPoint>,
    pub ranking: Vec<RankingEntry>,
    pub forecast: ForecastOutcome,
    pub insufficient_data: bool,
    pub error_banner: Option<String>,
    pub validation_error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of one fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub generation: u64,
    /// Sub-fetches whose result was dropped because a newer cycle started.
    pub discarded: usize,
}

impl CycleSummary {
    pub fn is_stale(&self) -> bool {
        self.discarded > 0
    }
}

/// View state plus the client feeding it. Clones share both.
#[derive(Clone)]
pub struct Dashboard {
    client: ApiClient,
    generation: FetchGeneration,
    state: Arc<RwLock<ViewState>>,
}

impl Dashboard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            generation: FetchGeneration::new(),
            state: Arc::new(RwLock::new(ViewState::default())),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Generation of the latest cycle started on this dashboard.
    pub fn current_generation(&self) -> u64 {
        self.generation.current()
    }

    /// Copy of the current view state.
    pub async fn snapshot(&self) -> ViewState {
        self.state.read().await.clone()
    }

    /// Runs one fetch cycle for `filters`.
    ///
    /// Never fails: technical errors end up in the error banner, and invalid
    /// filters end up in the validation message without any request being made.
    #[instrument(skip(self))]
    pub async fn refresh(&self, filters: FilterState) -> CycleSummary {
        let token = self.generation.begin();
        info!(generation = token.generation(), "Starting fetch cycle");

        if let Err(e) = filters.validate() {
            warn!(generation = token.generation(), "Rejecting invalid filters: {}", e);
            let message = format!("Filtros inválidos: {}", e);
            self.apply(&token, "validation", |state| {
                *state = ViewState {
                    generation: token.generation(),
                    filters: filters.clone(),
                    validation_error: Some(message),
                    ..ViewState::default()
                };
            })
            .await;
            return CycleSummary {
                generation: token.generation(),
                discarded: 0,
            };
        }

        self.apply(&token, "reset", |state| {
            state.generation = token.generation();
            state.filters = filters.clone();
            state.error_banner = None;
            state.validation_error = None;
            state.insufficient_data = false;
        })
        .await;

        let plan = self.client.reconciler().plan(&filters);
        debug!(?plan, "Forecast plan selected");

        let (overview, timeseries, ranking, forecast) = tokio::join!(
            async {
                let result = self.client.overview(&filters).await;
                self.apply_result(&token, "overview", result, |state, value| {
                    state.overview = value;
                })
                .await
            },
            async {
                let result = self.client.timeseries(&filters).await;
                self.apply_result(&token, "timeseries", result, |state, value| {
                    state.timeseries = value;
                })
                .await
            },
            async {
                let result = self.client.ranking(&filters).await;
                self.apply_result(&token, "ranking", result, |state, value| {
                    state.ranking = value;
                })
                .await
            },
            async {
                let result = self.client.forecast(&plan).await;
                self.apply_result(&token, "forecast", result, |state, outcome| {
                    state.insufficient_data = outcome.is_insufficient();
                    state.validation_error = match &outcome {
                        ForecastOutcome::ValidationError(message) => Some(message.clone()),
                        _ => None,
                    };
                    state.forecast = outcome;
                })
                .await
            },
        );

        let discarded = [overview, timeseries, ranking, forecast]
            .into_iter()
            .filter(|applied| !applied)
            .count();
        if discarded > 0 {
            info!(generation = token.generation(), discarded, "Fetch cycle superseded");
        } else {
            info!(generation = token.generation(), "Fetch cycle complete");
        }
        CycleSummary {
            generation: token.generation(),
            discarded,
        }
    }

    /// Writes a sub-fetch result, or resets that piece and raises the banner
    /// on error. Returns false when the cycle was superseded.
    async fn apply_result<T>(
        &self,
        token: &FetchToken,
        piece: &'static str,
        result: Result<T, ClientError>,
        write: impl FnOnce(&mut ViewState, T),
    ) -> bool {
        match result {
            Ok(value) => self.apply(token, piece, |state| write(state, value)).await,
            Err(e) => {
                error!(piece, generation = token.generation(), "Sub-fetch failed: {}", e);
                self.apply(token, piece, |state| {
                    reset_piece(state, piece);
                    state.error_banner = Some(LOAD_ERROR_MESSAGE.to_string());
                })
                .await
            }
        }
    }

    async fn apply(
        &self,
        token: &FetchToken,
        piece: &'static str,
        write: impl FnOnce(&mut ViewState),
    ) -> bool {
        let mut state = self.state.write().await;
        // Checked after the lock is held so a newer cycle cannot slip in between.
        if !token.is_current() {
            debug!(piece, generation = token.generation(), "Discarding stale result");
            return false;
        }
        write(&mut state);
        state.updated_at = Some(Utc::now());
        true
    }
}

fn reset_piece(state: &mut ViewState, piece: &str) {
    match piece {
        "overview" => state.overview = OverviewRecord::default(),
        "timeseries" => state.timeseries.clear(),
        "ranking" => state.ranking.clear(),
        "forecast" => {
            state.forecast = ForecastOutcome::Empty;
            state.insufficient_data = false;
            state.validation_error = None;
        }
        _ => {}
    }
}
