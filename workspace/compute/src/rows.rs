//! Comparison and forecast rows.
//!
//! Rows come from a database RPC and have been seen as objects with several
//! key spellings (`ano`/`year`/`f0`, ...) and as positional arrays
//! `[ano, quantidade, tipo]`.

use common::ComparisonRow;
use common::converters::{
    first_present, has_any_key, integer_from_value, optional_quantity, string_from_value,
};
use serde_json::Value;
use tracing::debug;

const YEAR_KEYS: &[&str] = &["ano", "year", "f0", "0", "ano_val"];
const QUANTITY_KEYS: &[&str] = &[
    "quantidade",
    "quant",
    "qtde",
    "f1",
    "1",
    "quantidade_val",
    "quantity",
];
const KIND_KEYS: &[&str] = &["tipo_dado", "tipo", "f2", "2", "kind"];
const ANNUALIZED_KEY: &str = "annualized";

/// Normalizes a single row, or `None` when no year can be recovered.
pub fn normalize_row(value: &Value) -> Option<ComparisonRow> {
    let (year, quantity, kind, annualized) = match value {
        Value::Object(object) => {
            let mut year = first_present(object, YEAR_KEYS);
            let mut quantity = first_present(object, QUANTITY_KEYS);
            let mut kind = first_present(object, KIND_KEYS);

            // Unknown key names: fall back to value order, but never for a
            // field whose key is present with a null value.
            if year.is_none() || quantity.is_none() {
                let values: Vec<&Value> = object
                    .iter()
                    .filter(|(key, _)| key.as_str() != ANNUALIZED_KEY)
                    .map(|(_, value)| value)
                    .collect();
                if values.len() >= 2 {
                    if year.is_none() && !has_any_key(object, YEAR_KEYS) {
                        year = Some(values[0]);
                    }
                    if quantity.is_none() && !has_any_key(object, QUANTITY_KEYS) {
                        quantity = Some(values[1]);
                    }
                    if kind.is_none() && !has_any_key(object, KIND_KEYS) {
                        kind = values.get(2).copied();
                    }
                }
            }

            let annualized = object
                .get(ANNUALIZED_KEY)
                .and_then(Value::as_bool)
                .unwrap_or(false);
            (year, quantity, kind, annualized)
        }
        Value::Array(items) if items.len() >= 2 => (items.first(), items.get(1), items.get(2), false),
        other => {
            debug!(row = %other, "Skipping row of unknown shape");
            return None;
        }
    };

    let Some(year) = integer_from_value(year).and_then(|y| i32::try_from(y).ok()) else {
        debug!(row = %value, "Skipping row without a usable year");
        return None;
    };

    Some(ComparisonRow {
        year,
        quantity: optional_quantity(quantity),
        kind: kind
            .filter(|v| !v.is_null())
            .map(|v| string_from_value(Some(v))),
        annualized,
    })
}

/// Whether a row holds observed data or a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Historical,
    Projection,
}

/// Classifies a row by its tag, falling back to its year when the tag is
/// missing or unknown.
pub fn classify(row: &ComparisonRow, projection_year: i32) -> RowKind {
    let tag = row
        .kind
        .as_deref()
        .map(|k| k.trim().to_lowercase())
        .unwrap_or_default();

    if tag.starts_with("hist") {
        RowKind::Historical
    } else if ["proje", "previs", "forecast"].iter().any(|p| tag.starts_with(p)) {
        RowKind::Projection
    } else if row.year >= projection_year {
        RowKind::Projection
    } else {
        RowKind::Historical
    }
}
