//! The older single-vaccine forecast endpoint (`/api/previsao`).
//!
//! It returns one row per year, history followed by the projection, straight
//! from the database RPC.

use common::{ComparisonRow, FilterState, ForecastPoint};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ComputeError, Result};
use crate::normalize::normalize;
use crate::query::{Endpoint, QueryParams, build_query};
use crate::rows::{RowKind, classify};

/// Query for the legacy endpoint; a vaccine name is mandatory.
pub fn legacy_query(filters: &FilterState) -> Result<QueryParams> {
    if filters.vaccine().is_none() {
        return Err(ComputeError::MissingVaccine);
    }
    Ok(build_query(Endpoint::LegacyForecast, filters))
}

/// Converts legacy rows into a yearly forecast series.
///
/// A lone projection row without a quantity means the RPC found no history,
/// which is reported as an empty series rather than a single zero point.
pub fn legacy_series(raw: &Value, projection_year: i32) -> Vec<ForecastPoint> {
    let rows: Vec<ComparisonRow> = match raw.get("rows") {
        Some(inner) if inner.is_array() => normalize(inner),
        _ => normalize(raw),
    };

    if let [only] = rows.as_slice() {
        if classify(only, projection_year) == RowKind::Projection && only.is_null_or_zero() {
            debug!("Legacy forecast holds only an empty projection, no data");
            return Vec::new();
        }
    }

    trace!(rows = rows.len(), "Converting legacy forecast rows");
    rows.iter()
        .map(|row| {
            let date = row.year.to_string();
            match classify(row, projection_year) {
                RowKind::Historical => ForecastPoint::historical(date, row.quantity),
                RowKind::Projection => ForecastPoint::projected(date, row.quantity),
            }
        })
        .collect()
}
