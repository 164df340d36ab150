//! Pure data-shaping for the dashboard: response normalization, query
//! building, annualization and forecast reconciliation. Nothing here performs
//! I/O except loading a supply mapping file.

pub mod annualize;
pub mod error;
pub mod forecast;
pub mod normalize;
pub mod query;
pub mod region;
pub mod rows;
pub mod supply;

pub use annualize::annualize;
pub use forecast::{ForecastOutcome, ForecastPlan, ForecastReconciler};
pub use normalize::{Canonical, ListItem, Shape, normalize, normalize_with_shape};
pub use query::{Endpoint, QueryParams, build_query};

/// Returns the reconciler configured for the current reference and projection years.
pub fn default_reconciler() -> ForecastReconciler {
    ForecastReconciler::default()
}
