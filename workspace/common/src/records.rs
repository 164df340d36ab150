use serde::{Deserialize, Serialize};

/// Headline totals for the current filter combination (`/api/overview`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewRecord {
    #[serde(rename = "total_doses")]
    pub total_doses: f64,
    #[serde(rename = "periodo", default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

/// One point of the distribution time series (`/api/timeseries`).
///
/// `date` is an opaque label ("2024-03", "2024", ...), never parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "doses_distribuidas")]
    pub doses_distributed: f64,
}

/// Doses distributed to one state (`/api/ranking/ufs`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    #[serde(rename = "uf")]
    pub region_name: String,
    #[serde(rename = "sigla")]
    pub region_code: String,
    #[serde(rename = "doses_distribuidas")]
    pub doses_distributed: f64,
}

/// One year of a historical-versus-projection comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    #[serde(rename = "ano")]
    pub year: i32,
    /// `None` means the backend had no usable data for the year.
    #[serde(rename = "quantidade")]
    pub quantity: Option<f64>,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Set once a monthly projection has been scaled to a yearly figure.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub annualized: bool,
}

impl ComparisonRow {
    pub fn new(year: i32, quantity: Option<f64>, kind: Option<&str>) -> Self {
        Self {
            year,
            quantity,
            kind: kind.map(str::to_string),
            annualized: false,
        }
    }

    /// True when the row carries no usable quantity.
    pub fn is_null_or_zero(&self) -> bool {
        self.quantity.is_none_or(|q| q == 0.0)
    }

    /// Display label: a dash for missing data, an asterisk on annualized values.
    pub fn display_quantity(&self) -> String {
        match self.quantity {
            None => "-".to_string(),
            Some(q) if self.annualized => format!("{}*", format_quantity(q)),
            Some(q) => format_quantity(q),
        }
    }
}

fn format_quantity(q: f64) -> String {
    if q.fract() == 0.0 {
        format!("{:.0}", q)
    } else {
        format!("{:.2}", q)
    }
}

/// Historical total paired with a projection (`/api/previsao/comparacao`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPayload {
    #[serde(rename = "projecao_unidade", default)]
    pub projection_unit: String,
    #[serde(rename = "dados_comparacao", default)]
    pub rows: Vec<ComparisonRow>,
    /// Absent means annualization is allowed.
    #[serde(rename = "anualizar", default, skip_serializing_if = "Option::is_none")]
    pub allow_annualize: Option<bool>,
}

impl ComparisonPayload {
    /// First row for `year`; duplicates after it are ignored.
    pub fn row_for_year(&self, year: i32) -> Option<&ComparisonRow> {
        self.rows.iter().find(|row| row.year == year)
    }

    pub fn annualize_allowed(&self) -> bool {
        self.allow_annualize.unwrap_or(true)
    }
}

/// A point of the forecast chart mixing historical and projected doses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(rename = "data", alias = "date")]
    pub date: String,
    #[serde(
        rename = "historico",
        alias = "historical",
        alias = "historical_doses",
        default
    )]
    pub historical_doses: Option<f64>,
    #[serde(
        rename = "previsao",
        alias = "forecast",
        alias = "projected",
        alias = "projected_doses",
        default
    )]
    pub projected_doses: Option<f64>,
    #[serde(
        rename = "limite_inferior",
        alias = "lower",
        alias = "lower_bound",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lower_bound: Option<f64>,
    #[serde(
        rename = "limite_superior",
        alias = "upper",
        alias = "upper_bound",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub upper_bound: Option<f64>,
}

impl ForecastPoint {
    pub fn historical(date: impl Into<String>, doses: Option<f64>) -> Self {
        Self {
            date: date.into(),
            historical_doses: doses,
            ..Default::default()
        }
    }

    pub fn projected(date: impl Into<String>, doses: Option<f64>) -> Self {
        Self {
            date: date.into(),
            projected_doses: doses,
            ..Default::default()
        }
    }
}

/// A vaccine with mapped supply records (`/api/mappings/available`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(rename = "vacina")]
    pub vaccine_name: String,
    #[serde(rename = "total_doses")]
    pub total_doses: f64,
}
