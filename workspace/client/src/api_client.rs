pub mod forecast;
pub mod mappings;
pub mod overview;
pub mod ranking;
pub mod timeseries;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::MappingEntry;
use compute::{Endpoint, ForecastReconciler, QueryParams};
use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{ClientError, Result};

/// Source of raw backend payloads.
///
/// Implementations return the decoded JSON body of a successful response and
/// a [`ClientError::Transport`] for any non-2xx status.
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    async fn get_json(&self, endpoint: Endpoint, query: &QueryParams) -> Result<Value>;
}

/// The analytics backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Builds a backend for `base_url` (e.g. `http://localhost:8000`).
    ///
    /// A blank or unparsable URL is rejected up front.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ClientError::MissingBaseUrl);
        }
        Url::parse(trimmed).map_err(|e| ClientError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: trimmed.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for an endpoint call.
    pub fn url(&self, endpoint: Endpoint, query: &QueryParams) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, endpoint.path())
        } else {
            format!("{}{}?{}", self.base_url, endpoint.path(), query.to_query_string())
        }
    }
}

#[async_trait]
impl AnalyticsBackend for HttpBackend {
    async fn get_json(&self, endpoint: Endpoint, query: &QueryParams) -> Result<Value> {
        let url = self.url(endpoint, query);
        debug!("GET request to: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("GET {} - Non-OK response: {}", endpoint.path(), status);
            return Err(ClientError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        trace!("GET {} - Response received, parsing JSON", endpoint.path());
        // A malformed body is not an error: the normalizer degrades it.
        let value = serde_json::from_str(&body).unwrap_or_else(|e| {
            debug!("GET {} - Body is not JSON ({}), using null", endpoint.path(), e);
            Value::Null
        });
        info!("GET {} - Success", endpoint.path());
        Ok(value)
    }
}

/// Typed access to the dashboard endpoints.
///
/// Cheap to clone; clones share the backend and the mappings cache.
#[derive(Clone)]
pub struct ApiClient {
    backend: Arc<dyn AnalyticsBackend>,
    reconciler: ForecastReconciler,
    mappings_cache: Cache<Endpoint, Arc<Vec<MappingEntry>>>,
}

impl ApiClient {
    pub fn new(backend: Arc<dyn AnalyticsBackend>) -> Self {
        Self::with_reconciler(backend, compute::default_reconciler())
    }

    pub fn with_reconciler(backend: Arc<dyn AnalyticsBackend>, reconciler: ForecastReconciler) -> Self {
        let mappings_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self {
            backend,
            reconciler,
            mappings_cache,
        }
    }

    /// Client over HTTP for `base_url`.
    pub fn connect(base_url: &str, timeout: Duration) -> Result<Self> {
        let backend = HttpBackend::new(base_url, timeout)?;
        info!("Analytics backend configured at {}", backend.base_url);
        Ok(Self::new(Arc::new(backend)))
    }

    pub fn reconciler(&self) -> &ForecastReconciler {
        &self.reconciler
    }

    /// Common GET request handler
    async fn get(&self, endpoint: Endpoint, query: &QueryParams) -> Result<Value> {
        self.backend
            .get_json(endpoint, query)
            .await
            .inspect_err(|e| error!("GET {} - {}", endpoint.path(), e))
    }
}
