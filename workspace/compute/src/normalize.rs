//! Response normalization.
//!
//! The backend has wrapped the same payload in several ways over time: bare,
//! under `data`, under `result`. Each wrapper is a [`Shape`]; shapes are tried in
//! a fixed order and the first one that yields a record wins. [`Shape::Empty`]
//! always matches, so normalization never fails.

use common::converters::{count_from_value, first_present, optional_quantity, string_from_value};
use common::{
    ComparisonPayload, ComparisonRow, ForecastPoint, MappingEntry, OverviewRecord, RankingEntry,
    TimeseriesPoint,
};
use serde_json::Value;
use tracing::{debug, trace};

use crate::region::normalize_region_code;
use crate::rows::normalize_row;

/// Payload wrappers, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The value is already the endpoint's shape.
    Direct,
    /// The record sits under a `data` field.
    NestedData,
    /// The record sits under a `result` field.
    NestedResult,
    /// Nothing matched; the typed default is used.
    Empty,
}

impl Shape {
    pub const ORDER: [Shape; 4] = [
        Shape::Direct,
        Shape::NestedData,
        Shape::NestedResult,
        Shape::Empty,
    ];

    fn extract<T: Canonical>(self, value: &Value) -> Option<T> {
        match self {
            Shape::Direct => T::direct(value),
            Shape::NestedData => nested(value, "data"),
            Shape::NestedResult => nested(value, "result"),
            Shape::Empty => Some(T::default()),
        }
    }
}

/// A canonical record an endpoint payload normalizes into.
pub trait Canonical: Default {
    /// Builds the record when `value` is in the endpoint's direct shape.
    fn direct(value: &Value) -> Option<Self>;
}

/// One element of a list endpoint.
pub trait ListItem: Sized {
    /// Builds an element; `None` drops it from the list.
    fn from_item(value: &Value) -> Option<Self>;
}

/// Normalizes `value` into `T`, degrading to `T::default()` on any mismatch.
pub fn normalize<T: Canonical>(value: &Value) -> T {
    normalize_with_shape(value).1
}

/// Like [`normalize`], also reporting which shape matched.
pub fn normalize_with_shape<T: Canonical>(value: &Value) -> (Shape, T) {
    for shape in Shape::ORDER {
        if let Some(record) = shape.extract::<T>(value) {
            if shape == Shape::Empty {
                debug!("Payload matched no known shape, using default record");
            } else {
                trace!(?shape, "Payload normalized");
            }
            return (shape, record);
        }
    }
    (Shape::Empty, T::default())
}

fn nested<T: Canonical>(value: &Value, key: &str) -> Option<T> {
    let inner = value.as_object()?.get(key)?;
    if !(inner.is_object() || inner.is_array()) {
        return None;
    }
    match normalize_with_shape::<T>(inner) {
        (Shape::Empty, _) => None,
        (_, record) => Some(record),
    }
}

impl<T: ListItem> Canonical for Vec<T> {
    fn direct(value: &Value) -> Option<Self> {
        value
            .as_array()
            .map(|items| items.iter().filter_map(T::from_item).collect())
    }
}

impl Canonical for OverviewRecord {
    fn direct(value: &Value) -> Option<Self> {
        match value {
            Value::Object(object) if object.contains_key("total_doses") => Some(OverviewRecord {
                total_doses: count_from_value(object.get("total_doses")),
                period: object
                    .get("periodo")
                    .filter(|v| !v.is_null())
                    .map(|v| string_from_value(Some(v))),
            }),
            // A list of overviews: the first one is the headline.
            Value::Array(items) => match normalize_with_shape::<OverviewRecord>(items.first()?) {
                (Shape::Empty, _) => None,
                (_, record) => Some(record),
            },
            _ => None,
        }
    }
}

impl Canonical for ComparisonPayload {
    fn direct(value: &Value) -> Option<Self> {
        match value {
            Value::Object(object) => {
                let rows = ["dados_comparacao", "rows"]
                    .iter()
                    .filter_map(|key| object.get(*key))
                    .find_map(Value::as_array)?;
                Some(ComparisonPayload {
                    projection_unit: string_from_value(object.get("projecao_unidade")),
                    rows: rows.iter().filter_map(normalize_row).collect(),
                    allow_annualize: first_present(object, &["anualizar", "allow_annualize"])
                        .and_then(Value::as_bool),
                })
            }
            Value::Array(items) => Some(ComparisonPayload {
                rows: items.iter().filter_map(normalize_row).collect(),
                ..Default::default()
            }),
            _ => None,
        }
    }
}

impl ListItem for TimeseriesPoint {
    fn from_item(value: &Value) -> Option<Self> {
        let Some(object) = value.as_object() else {
            return Some(TimeseriesPoint::default());
        };
        Some(TimeseriesPoint {
            date: string_from_value(first_present(object, &["data", "date"])),
            doses_distributed: count_from_value(first_present(
                object,
                &["doses_distribuidas", "doses"],
            )),
        })
    }
}

impl ListItem for RankingEntry {
    fn from_item(value: &Value) -> Option<Self> {
        let Some(object) = value.as_object() else {
            return Some(RankingEntry::default());
        };
        let raw_code = string_from_value(object.get("sigla"));
        Some(RankingEntry {
            region_name: string_from_value(first_present(object, &["uf", "nome"])),
            region_code: normalize_region_code(&raw_code).unwrap_or_default(),
            doses_distributed: count_from_value(object.get("doses_distribuidas")),
        })
    }
}

impl ListItem for MappingEntry {
    fn from_item(value: &Value) -> Option<Self> {
        let Some(object) = value.as_object() else {
            return Some(MappingEntry::default());
        };
        Some(MappingEntry {
            vaccine_name: string_from_value(first_present(object, &["vacina", "nome"])),
            total_doses: count_from_value(first_present(object, &["total_doses", "qtde"])),
        })
    }
}

impl ListItem for ForecastPoint {
    fn from_item(value: &Value) -> Option<Self> {
        let Some(object) = value.as_object() else {
            debug!("Dropping forecast point that is not an object");
            return None;
        };
        Some(ForecastPoint {
            date: string_from_value(first_present(object, &["data", "date"])),
            historical_doses: optional_quantity(first_present(
                object,
                &["historico", "historical", "historical_doses"],
            )),
            projected_doses: optional_quantity(first_present(
                object,
                &["previsao", "forecast", "projected", "projected_doses"],
            )),
            lower_bound: optional_quantity(first_present(
                object,
                &["limite_inferior", "lower", "lower_bound"],
            )),
            upper_bound: optional_quantity(first_present(
                object,
                &["limite_superior", "upper", "upper_bound"],
            )),
        })
    }
}

impl ListItem for ComparisonRow {
    fn from_item(value: &Value) -> Option<Self> {
        normalize_row(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timeseries_inner() -> Value {
        json!([
            {"data": "2024-01", "doses_distribuidas": 120},
            {"data": "2024-02", "doses_distribuidas": "80"},
        ])
    }

    #[test]
    fn test_wrappers_produce_identical_lists() {
        let inner = timeseries_inner();
        let bare: Vec<TimeseriesPoint> = normalize(&inner);
        let data: Vec<TimeseriesPoint> = normalize(&json!({"data": inner.clone()}));
        let result: Vec<TimeseriesPoint> = normalize(&json!({"result": inner.clone()}));
        let double: Vec<TimeseriesPoint> = normalize(&json!({"data": {"result": inner}}));

        assert_eq!(bare.len(), 2);
        assert_eq!(bare, data);
        assert_eq!(bare, result);
        assert_eq!(bare, double);
        assert_eq!(bare[1].doses_distributed, 80.0);
    }

    #[test]
    fn test_shape_reporting() {
        let inner = timeseries_inner();
        assert_eq!(normalize_with_shape::<Vec<TimeseriesPoint>>(&inner).0, Shape::Direct);
        assert_eq!(
            normalize_with_shape::<Vec<TimeseriesPoint>>(&json!({"data": inner.clone()})).0,
            Shape::NestedData
        );
        assert_eq!(
            normalize_with_shape::<Vec<TimeseriesPoint>>(&json!({"result": inner})).0,
            Shape::NestedResult
        );
        assert_eq!(
            normalize_with_shape::<Vec<TimeseriesPoint>>(&json!("oops")).0,
            Shape::Empty
        );
    }

    #[test]
    fn test_nested_data_falls_through_to_result() {
        // `data` holds a string here, so only `result` can match.
        let value = json!({"data": "2024-01", "result": [{"data": "2024-01", "doses_distribuidas": 5}]});
        let points: Vec<TimeseriesPoint> = normalize(&value);
        assert_eq!(points, vec![TimeseriesPoint { date: "2024-01".into(), doses_distributed: 5.0 }]);
    }

    #[test]
    fn test_unknown_shapes_degrade_to_defaults() {
        let points: Vec<TimeseriesPoint> = normalize(&json!({"items": []}));
        assert!(points.is_empty());

        let overview: OverviewRecord = normalize(&Value::Null);
        assert_eq!(overview, OverviewRecord { total_doses: 0.0, period: None });

        let overview: OverviewRecord = normalize(&json!({"total": 9}));
        assert_eq!(overview.total_doses, 0.0);
    }

    #[test]
    fn test_overview_wrappers() {
        let direct: OverviewRecord = normalize(&json!({"total_doses": 1500, "periodo": "2024"}));
        let wrapped: OverviewRecord =
            normalize(&json!({"data": {"total_doses": 1500, "periodo": "2024"}}));
        let listed: OverviewRecord =
            normalize(&json!({"result": [{"total_doses": 1500, "periodo": "2024"}]}));
        assert_eq!(direct.total_doses, 1500.0);
        assert_eq!(direct.period.as_deref(), Some("2024"));
        assert_eq!(direct, wrapped);
        assert_eq!(direct, listed);
    }

    #[test]
    fn test_missing_fields_default() {
        let points: Vec<TimeseriesPoint> = normalize(&json!([{}, 5, {"data": null, "doses_distribuidas": "x"}]));
        assert_eq!(points, vec![TimeseriesPoint::default(); 3]);

        let ranking: Vec<RankingEntry> = normalize(&json!([{"doses_distribuidas": null}]));
        assert_eq!(ranking, vec![RankingEntry::default()]);
    }

    #[test]
    fn test_ranking_normalizes_region_codes() {
        let ranking: Vec<RankingEntry> = normalize(&json!({"data": [
            {"uf": "São Paulo", "sigla": "SES-SP", "doses_distribuidas": 900},
            {"uf": "Rio de Janeiro", "sigla": "rj", "doses_distribuidas": 400},
        ]}));
        assert_eq!(ranking[0].region_code, "SP");
        assert_eq!(ranking[0].region_name, "São Paulo");
        assert_eq!(ranking[1].region_code, "RJ");
    }

    #[test]
    fn test_mappings_accept_alternate_keys() {
        let mappings: Vec<MappingEntry> = normalize(&json!([
            {"vacina": "BCG", "total_doses": 10},
            {"nome": "Febre Amarela", "qtde": "25"},
        ]));
        assert_eq!(mappings[1].vaccine_name, "Febre Amarela");
        assert_eq!(mappings[1].total_doses, 25.0);
    }

    #[test]
    fn test_comparison_payload_shapes() {
        let inner = json!({
            "projecao_unidade": "mensal",
            "dados_comparacao": [
                {"ano": 2024, "quantidade": 1000, "tipo": "historico"},
                {"ano": 2025, "quantidade": null, "tipo": "projeção"},
            ]
        });
        let direct: ComparisonPayload = normalize(&inner);
        let wrapped: ComparisonPayload = normalize(&json!({"data": inner}));
        assert_eq!(direct, wrapped);
        assert_eq!(direct.projection_unit, "mensal");
        assert_eq!(direct.rows.len(), 2);
        assert_eq!(direct.rows[1].quantity, None);
        assert_eq!(direct.allow_annualize, None);

        let bare: ComparisonPayload = normalize(&json!([[2024, 10, "historico"]]));
        assert_eq!(bare.projection_unit, "");
        assert_eq!(bare.rows[0].quantity, Some(10.0));
    }

    #[test]
    fn test_normalizer_is_idempotent() {
        let ranking: Vec<RankingEntry> = normalize(&json!({"result": [
            {"uf": "Bahia", "sigla": " ba ", "doses_distribuidas": "12"},
            {"sigla": 7},
        ]}));
        let again: Vec<RankingEntry> = normalize(&serde_json::to_value(&ranking).unwrap());
        assert_eq!(ranking, again);

        let overview: OverviewRecord = normalize(&json!({"data": {"total_doses": "3"}}));
        let again: OverviewRecord = normalize(&serde_json::to_value(&overview).unwrap());
        assert_eq!(overview, again);

        let mut payload: ComparisonPayload = normalize(&json!({
            "projecao_unidade": "mensal",
            "anualizar": false,
            "dados_comparacao": [{"ano": "2024", "quantidade": null}, {"ano": 2025, "quantidade": 3}]
        }));
        payload.rows[1].annualized = true;
        let again: ComparisonPayload = normalize(&serde_json::to_value(&payload).unwrap());
        assert_eq!(payload, again);

        let points: Vec<TimeseriesPoint> = normalize(&timeseries_inner());
        let again: Vec<TimeseriesPoint> = normalize(&serde_json::to_value(&points).unwrap());
        assert_eq!(points, again);
    }
}
