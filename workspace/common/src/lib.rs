//! Common transport-layer types shared between the normalization layer, the HTTP
//! client and the CLI. The records mirror the analytics backend payloads: they
//! serialize with the backend's own field names so that canonical output can be
//! fed back through the normalizer unchanged.

pub mod converters;
mod filters;
mod records;

pub use filters::FilterState;
pub use records::{
    ComparisonPayload, ComparisonRow, ForecastPoint, MappingEntry, OverviewRecord, RankingEntry,
    TimeseriesPoint,
};

/// Reference year used as the historical baseline of a comparison.
pub const REFERENCE_YEAR: i32 = 2024;

/// Year holding the projection in a comparison payload.
pub const PROJECTION_YEAR: i32 = 2025;

/// Unit tag the backend uses for monthly projections.
pub const MONTHLY_UNIT: &str = "mensal";
