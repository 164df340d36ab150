use std::fmt::Display;

use common::FilterState;
use url::form_urlencoded;

/// Backend endpoints consumed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Overview,
    Timeseries,
    Ranking,
    Forecast,
    LegacyForecast,
    Comparison,
    Mappings,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Overview => "/api/overview",
            Endpoint::Timeseries => "/api/timeseries",
            Endpoint::Ranking => "/api/ranking/ufs",
            Endpoint::Forecast => "/api/forecast",
            Endpoint::LegacyForecast => "/api/previsao",
            Endpoint::Comparison => "/api/previsao/comparacao",
            Endpoint::Mappings => "/api/mappings/available",
        }
    }
}

/// Ordered query parameters holding only non-empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    /// Adds `name` when `value` is present and not empty once stringified.
    pub fn push<V: Display>(&mut self, name: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.is_empty() {
                self.0.push((name, value));
            }
        }
        self
    }

    /// Like [`QueryParams::push`], trimming the value first.
    pub fn push_trimmed(&mut self, name: &'static str, value: Option<&str>) -> &mut Self {
        self.push(name, value.map(str::trim))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// URL-encoded `key=value&...` without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.0 {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

/// Builds the query for `endpoint` from the user's filters.
pub fn build_query(endpoint: Endpoint, filters: &FilterState) -> QueryParams {
    let mut params = QueryParams::default();
    match endpoint {
        Endpoint::Overview | Endpoint::Timeseries | Endpoint::Ranking | Endpoint::Forecast => {
            params
                .push("ano", filters.year)
                .push("mes", filters.month)
                .push("uf", filters.state_code.as_deref())
                .push("vacina", filters.vaccine_name.as_deref())
                .push("fabricante", filters.manufacturer.as_deref());
        }
        Endpoint::LegacyForecast => {
            params
                .push_trimmed("insumo_nome", filters.vaccine_name.as_deref())
                .push_trimmed("uf", filters.state_code.as_deref())
                .push("mes", filters.month);
        }
        Endpoint::Comparison => {
            return comparison_query(
                filters.year,
                filters.vaccine_name.as_deref(),
                filters.state_code.as_deref(),
                filters.month,
            );
        }
        Endpoint::Mappings => {}
    }
    params
}

/// Query for the comparison endpoint. String values are trimmed, and a blank
/// vaccine name is left out.
pub fn comparison_query(
    year: Option<i32>,
    vaccine: Option<&str>,
    state: Option<&str>,
    month: Option<u32>,
) -> QueryParams {
    let mut params = QueryParams::default();
    params
        .push_trimmed("insumo_nome", vaccine)
        .push("ano", year)
        .push_trimmed("uf", state)
        .push("mes", month);
    params
}
