//! Async client for the vaccine analytics backend.
//!
//! [`ApiClient`] fetches and normalizes each endpoint; [`Dashboard`] runs the
//! concurrent fetch cycles behind a filter change and keeps the view state.

pub mod api_client;
pub mod dashboard;
pub mod error;
pub mod generation;

#[cfg(test)]
mod testing;

pub use api_client::{AnalyticsBackend, ApiClient, HttpBackend};
pub use dashboard::{CycleSummary, Dashboard, LOAD_ERROR_MESSAGE, ViewState};
pub use error::{ClientError, Result};
pub use generation::{FetchGeneration, FetchToken};
