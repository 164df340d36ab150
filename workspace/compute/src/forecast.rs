//! Forecast reconciliation.
//!
//! The forecast view is fed by one of two endpoints depending on the active
//! filters: the plain forecast series, or the year/vaccine comparison. This
//! module decides which one a fetch cycle calls ([`ForecastPlan`]) and turns the
//! response into a [`ForecastOutcome`] the view can render directly.

pub mod legacy;

use common::{
    ComparisonPayload, FilterState, ForecastPoint, PROJECTION_YEAR, REFERENCE_YEAR,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::annualize::annualize;
use crate::normalize::normalize;
use crate::query::{Endpoint, QueryParams, build_query, comparison_query};
use crate::rows::{RowKind, classify};

/// Which backend call, if any, feeds the forecast view for a filter combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastPlan {
    /// Nothing selected: the forecast view stays empty and nothing is fetched.
    NoFilter,
    /// A vaccine is selected: compare it against the fixed reference year.
    VaccineSelected {
        vaccine: String,
        year: i32,
        state: Option<String>,
        month: Option<u32>,
    },
    /// Only a year is selected: compare all vaccines for that year.
    YearOnlyNoVaccine {
        year: i32,
        state: Option<String>,
        month: Option<u32>,
    },
    /// Anything else: the plain forecast series, passed through.
    Default { query: QueryParams },
}

impl ForecastPlan {
    /// The endpoint and query this plan calls, `None` for [`ForecastPlan::NoFilter`].
    pub fn request(&self) -> Option<(Endpoint, QueryParams)> {
        match self {
            ForecastPlan::NoFilter => None,
            ForecastPlan::VaccineSelected {
                vaccine,
                year,
                state,
                month,
            } => Some((
                Endpoint::Comparison,
                comparison_query(Some(*year), Some(vaccine), state.as_deref(), *month),
            )),
            ForecastPlan::YearOnlyNoVaccine { year, state, month } => Some((
                Endpoint::Comparison,
                comparison_query(Some(*year), None, state.as_deref(), *month),
            )),
            ForecastPlan::Default { query } => Some((Endpoint::Forecast, query.clone())),
        }
    }

    /// Year of the historical row a comparison is anchored on.
    pub fn reference_year(&self) -> Option<i32> {
        match self {
            ForecastPlan::VaccineSelected { year, .. }
            | ForecastPlan::YearOnlyNoVaccine { year, .. } => Some(*year),
            _ => None,
        }
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            ForecastPlan::VaccineSelected { month, .. }
            | ForecastPlan::YearOnlyNoVaccine { month, .. } => *month,
            _ => None,
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.reference_year().is_some()
    }
}

/// What the forecast view shows after a fetch cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ForecastOutcome {
    /// No filter selected.
    #[default]
    Empty,
    /// Chart-ready forecast points.
    Series(Vec<ForecastPoint>),
    /// A comparison payload for the bar chart, already annualized.
    Comparison(ComparisonPayload),
    /// Both comparison years were null or zero.
    InsufficientData,
    /// The comparison endpoint rejected the filters; the body is shown as-is.
    ValidationError(String),
}

impl ForecastOutcome {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, ForecastOutcome::InsufficientData)
    }

    /// Points to plot; empty unless the outcome is a series.
    pub fn series(&self) -> &[ForecastPoint] {
        match self {
            ForecastOutcome::Series(points) => points,
            _ => &[],
        }
    }
}

/// Chooses forecast endpoints and reshapes their responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastReconciler {
    reference_year: i32,
    projection_year: i32,
}

impl Default for ForecastReconciler {
    fn default() -> Self {
        Self::new(REFERENCE_YEAR, PROJECTION_YEAR)
    }
}

impl ForecastReconciler {
    pub fn new(reference_year: i32, projection_year: i32) -> Self {
        Self {
            reference_year,
            projection_year,
        }
    }

    pub fn projection_year(&self) -> i32 {
        self.projection_year
    }

    /// Picks the plan for a filter combination.
    pub fn plan(&self, filters: &FilterState) -> ForecastPlan {
        if filters.is_unfiltered() {
            return ForecastPlan::NoFilter;
        }
        let state = filters.state().map(str::to_string);
        let month = filters.month.filter(|m| (1..=12).contains(m));
        if month != filters.month {
            warn!(month = ?filters.month, "Ignoring out-of-range month filter");
        }
        if let Some(vaccine) = filters.vaccine() {
            return ForecastPlan::VaccineSelected {
                vaccine: vaccine.to_string(),
                year: self.reference_year,
                state,
                month,
            };
        }
        if let Some(year) = filters.year {
            return ForecastPlan::YearOnlyNoVaccine {
                year,
                state,
                month,
            };
        }
        ForecastPlan::Default {
            query: build_query(Endpoint::Forecast, filters),
        }
    }

    /// Reconciles a successful comparison response.
    ///
    /// The payload is annualized exactly once here, before any merging.
    #[instrument(skip(self, payload), fields(rows = payload.rows.len()))]
    pub fn reconcile_comparison(
        &self,
        plan: &ForecastPlan,
        payload: ComparisonPayload,
    ) -> ForecastOutcome {
        let Some(primary_year) = plan.reference_year() else {
            warn!(?plan, "Comparison payload received for a non-comparison plan");
            return ForecastOutcome::Empty;
        };

        let payload = annualize(payload, self.projection_year);

        let primary_empty = payload
            .row_for_year(primary_year)
            .is_none_or(|row| row.is_null_or_zero());
        let secondary_empty = payload
            .row_for_year(self.projection_year)
            .is_none_or(|row| row.is_null_or_zero());
        if primary_empty && secondary_empty {
            info!(primary_year, "Comparison has no data for either year");
            return ForecastOutcome::InsufficientData;
        }

        match plan.month() {
            Some(month) => {
                let points = self.month_series(&payload, primary_year, month);
                debug!(points = points.len(), "Merged comparison into monthly series");
                ForecastOutcome::Series(points)
            }
            None => ForecastOutcome::Comparison(payload),
        }
    }

    /// Reconciles a failed comparison call.
    ///
    /// A 400 carries a validation message meant for the user; anything else is
    /// reported as missing data without an error.
    pub fn reconcile_failure(&self, status: Option<u16>, body: &str) -> ForecastOutcome {
        if status == Some(400) {
            info!("Comparison rejected by backend validation");
            return ForecastOutcome::ValidationError(body.to_string());
        }
        warn!(?status, "Comparison request failed, treating as insufficient data");
        ForecastOutcome::InsufficientData
    }

    /// Passes the plain forecast series through, point by point.
    pub fn reconcile_series(&self, raw: Value) -> ForecastOutcome {
        let points: Vec<ForecastPoint> = normalize(&raw);
        debug!(points = points.len(), "Forecast series normalized");
        ForecastOutcome::Series(points)
    }

    /// Turns the reference and projection rows into two points sharing the
    /// selected month.
    fn month_series(
        &self,
        payload: &ComparisonPayload,
        primary_year: i32,
        month: u32,
    ) -> Vec<ForecastPoint> {
        let mut years = vec![primary_year];
        if self.projection_year != primary_year {
            years.push(self.projection_year);
        }

        years
            .into_iter()
            .filter_map(|year| payload.row_for_year(year))
            .map(|row| {
                let date = format!("{}-{:02}", row.year, month);
                match classify(row, self.projection_year) {
                    RowKind::Historical => ForecastPoint::historical(date, row.quantity),
                    RowKind::Projection => ForecastPoint::projected(date, row.quantity),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ComparisonRow;
    use serde_json::json;

    fn comparison(unit: &str, rows: Vec<ComparisonRow>) -> ComparisonPayload {
        ComparisonPayload {
            projection_unit: unit.to_string(),
            rows,
            allow_annualize: None,
        }
    }

    fn vaccine_plan(month: Option<u32>) -> ForecastPlan {
        let mut filters = FilterState::default().with_vaccine("BCG");
        filters.month = month;
        ForecastReconciler::default().plan(&filters)
    }

    #[test]
    fn test_plan_selection() {
        let reconciler = ForecastReconciler::default();

        assert_eq!(reconciler.plan(&FilterState::default()), ForecastPlan::NoFilter);

        let plan = reconciler.plan(&FilterState::default().with_vaccine(" BCG ").with_year(2022));
        assert_eq!(
            plan,
            ForecastPlan::VaccineSelected {
                vaccine: "BCG".to_string(),
                year: 2024,
                state: None,
                month: None,
            }
        );

        let plan = reconciler.plan(&FilterState::default().with_year(2023).with_state("SP"));
        assert_eq!(
            plan,
            ForecastPlan::YearOnlyNoVaccine {
                year: 2023,
                state: Some("SP".to_string()),
                month: None,
            }
        );

        let plan = reconciler.plan(&FilterState::default().with_state("SP").with_month(2));
        assert!(matches!(plan, ForecastPlan::Default { .. }));
        assert!(!plan.is_comparison());
    }

    #[test]
    fn test_plan_requests() {
        let reconciler = ForecastReconciler::default();
        assert_eq!(ForecastPlan::NoFilter.request(), None);

        let plan = reconciler.plan(
            &FilterState::default()
                .with_vaccine("Febre Amarela")
                .with_state("MG")
                .with_month(6),
        );
        let (endpoint, query) = plan.request().unwrap();
        assert_eq!(endpoint, Endpoint::Comparison);
        assert_eq!(
            query.to_query_string(),
            "insumo_nome=Febre+Amarela&ano=2024&uf=MG&mes=6"
        );

        let plan = reconciler.plan(&FilterState::default().with_year(2023));
        let (_, query) = plan.request().unwrap();
        assert_eq!(query.to_query_string(), "ano=2023");

        let plan = reconciler.plan(&FilterState::default().with_state("BA"));
        let (endpoint, query) = plan.request().unwrap();
        assert_eq!(endpoint, Endpoint::Forecast);
        assert_eq!(query.to_query_string(), "uf=BA");
    }

    #[test]
    fn test_insufficient_data_when_both_years_empty() {
        let reconciler = ForecastReconciler::default();
        let payload = comparison(
            "anual",
            vec![
                ComparisonRow::new(2024, None, None),
                ComparisonRow::new(2025, Some(0.0), None),
            ],
        );
        let outcome = reconciler.reconcile_comparison(&vaccine_plan(None), payload);
        assert!(outcome.is_insufficient());
        assert!(outcome.series().is_empty());
    }

    #[test]
    fn test_zero_history_with_projection_is_available() {
        let reconciler = ForecastReconciler::default();
        let payload = comparison(
            "anual",
            vec![
                ComparisonRow::new(2024, Some(0.0), None),
                ComparisonRow::new(2025, Some(5.0), None),
            ],
        );
        let outcome = reconciler.reconcile_comparison(&vaccine_plan(None), payload.clone());
        assert_eq!(outcome, ForecastOutcome::Comparison(payload));
    }

    #[test]
    fn test_missing_rows_count_as_empty() {
        let reconciler = ForecastReconciler::default();
        let outcome =
            reconciler.reconcile_comparison(&vaccine_plan(None), comparison("mensal", vec![]));
        assert_eq!(outcome, ForecastOutcome::InsufficientData);
    }

    #[test]
    fn test_month_filter_merges_into_two_points() {
        let reconciler = ForecastReconciler::default();
        let payload = comparison(
            "anual",
            vec![
                ComparisonRow::new(2024, Some(500.0), Some("historico")),
                ComparisonRow::new(2025, Some(50.0), Some("projeção")),
            ],
        );
        let outcome = reconciler.reconcile_comparison(&vaccine_plan(Some(6)), payload);
        assert_eq!(
            outcome.series(),
            &[
                ForecastPoint::historical("2024-06", Some(500.0)),
                ForecastPoint::projected("2025-06", Some(50.0)),
            ]
        );
        let first = &outcome.series()[0];
        assert_eq!(first.projected_doses, None);
    }

    #[test]
    fn test_comparison_without_month_is_annualized_once() {
        let reconciler = ForecastReconciler::default();
        let payload = comparison(
            "mensal",
            vec![
                ComparisonRow::new(2024, Some(1000.0), Some("historico")),
                ComparisonRow::new(2025, Some(100.0), Some("projeção")),
            ],
        );
        let ForecastOutcome::Comparison(result) =
            reconciler.reconcile_comparison(&vaccine_plan(None), payload)
        else {
            panic!("expected a comparison outcome");
        };
        assert_eq!(result.rows[0].quantity, Some(1000.0));
        assert_eq!(result.rows[1].quantity, Some(1200.0));
        assert!(result.rows[1].annualized);
    }

    #[test]
    fn test_year_only_plan_uses_selected_year() {
        let reconciler = ForecastReconciler::default();
        let plan = reconciler.plan(&FilterState::default().with_year(2023).with_month(1));
        let payload = comparison(
            "anual",
            vec![
                ComparisonRow::new(2023, Some(10.0), Some("historico")),
                ComparisonRow::new(2024, Some(99.0), Some("historico")),
                ComparisonRow::new(2025, None, Some("projeção")),
            ],
        );
        let outcome = reconciler.reconcile_comparison(&plan, payload);
        assert_eq!(
            outcome.series(),
            &[
                ForecastPoint::historical("2023-01", Some(10.0)),
                ForecastPoint::projected("2025-01", None),
            ]
        );
    }

    #[test]
    fn test_duplicate_years_take_first_row() {
        let reconciler = ForecastReconciler::default();
        let payload = comparison(
            "anual",
            vec![
                ComparisonRow::new(2024, Some(1.0), Some("historico")),
                ComparisonRow::new(2024, Some(2.0), Some("historico")),
                ComparisonRow::new(2025, Some(3.0), Some("projeção")),
            ],
        );
        let outcome = reconciler.reconcile_comparison(&vaccine_plan(Some(12)), payload);
        assert_eq!(outcome.series()[0].historical_doses, Some(1.0));
        assert_eq!(outcome.series()[0].date, "2024-12");
    }

    #[test]
    fn test_out_of_range_month_is_ignored() {
        let reconciler = ForecastReconciler::default();
        let plan = reconciler.plan(&FilterState::default().with_vaccine("BCG").with_month(13));
        assert_eq!(plan.month(), None);

        let payload = ComparisonPayload {
            projection_unit: "anual".to_string(),
            rows: vec![
                ComparisonRow::new(2024, Some(500.0), Some("historico")),
                ComparisonRow::new(2025, Some(50.0), Some("projeção")),
            ],
            allow_annualize: None,
        };
        assert!(matches!(
            reconciler.reconcile_comparison(&plan, payload),
            ForecastOutcome::Comparison(_)
        ));
    }

    #[test]
    fn test_failure_policy() {
        let reconciler = ForecastReconciler::default();
        assert_eq!(
            reconciler.reconcile_failure(Some(400), "ano deve ser 2024"),
            ForecastOutcome::ValidationError("ano deve ser 2024".to_string())
        );
        assert_eq!(
            reconciler.reconcile_failure(Some(500), "boom"),
            ForecastOutcome::InsufficientData
        );
        assert_eq!(
            reconciler.reconcile_failure(None, "connection refused"),
            ForecastOutcome::InsufficientData
        );
    }

    #[test]
    fn test_series_passthrough() {
        let reconciler = ForecastReconciler::default();
        let outcome = reconciler.reconcile_series(json!([
            {"data": "2025-01", "historico": null, "previsao": 120.0, "limite_inferior": 100.0},
            {"date": "2024-12", "historical": 90.0}
        ]));
        let points = outcome.series();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].lower_bound, Some(100.0));
        assert_eq!(points[1].historical_doses, Some(90.0));

        let outcome = reconciler.reconcile_series(json!({"unexpected": true}));
        assert_eq!(outcome, ForecastOutcome::Series(vec![]));
    }

    #[test]
    fn test_series_keeps_good_points_around_odd_ones() {
        let reconciler = ForecastReconciler::default();
        let outcome = reconciler.reconcile_series(json!([
            {"data": "2025-01", "previsao": 120.0},
            {"data": "2025-02", "previsao": "130"},
            {"data": 2026, "previsao": 140},
            {"data": "2025-03", "date": "ignored", "previsao": "n/a"},
            "garbage"
        ]));
        let points = outcome.series();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].projected_doses, Some(120.0));
        assert_eq!(points[1].projected_doses, Some(130.0));
        assert_eq!(points[2].date, "2026");
        assert_eq!(points[2].projected_doses, Some(140.0));
        assert_eq!(points[3].date, "2025-03");
        assert_eq!(points[3].projected_doses, None);

        let wrapped = reconciler.reconcile_series(json!({"data": [{"data": "2025-01", "previsao": 120.0}]}));
        assert_eq!(wrapped.series(), &points[..1]);
    }

    #[test]
    fn test_outcome_serialization() {
        let value = serde_json::to_value(ForecastOutcome::InsufficientData).unwrap();
        assert_eq!(value, json!({"status": "insufficient_data"}));
        let value = serde_json::to_value(ForecastOutcome::ValidationError("x".into())).unwrap();
        assert_eq!(value, json!({"status": "validation_error", "data": "x"}));
    }
}
