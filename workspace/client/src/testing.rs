//! In-memory backend for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use compute::{Endpoint, QueryParams};
use serde_json::Value;

use crate::api_client::AnalyticsBackend;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
struct Route {
    endpoint: Endpoint,
    query: Option<String>,
    delay: Duration,
    response: std::result::Result<Value, (u16, String)>,
}

/// A backend answering from scripted routes, optionally after a delay.
///
/// Routes with an exact query win over endpoint-wide routes. Unscripted calls
/// answer `null`, which normalizes to empty records.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<(Endpoint, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(
        mut self,
        endpoint: Endpoint,
        query: Option<&str>,
        delay: Duration,
        response: std::result::Result<Value, (u16, String)>,
    ) -> Self {
        self.routes
            .get_mut()
            .expect("routes lock poisoned")
            .push(Route {
                endpoint,
                query: query.map(str::to_string),
                delay,
                response,
            });
        self
    }

    pub fn respond(self, endpoint: Endpoint, body: Value) -> Self {
        self.route(endpoint, None, Duration::ZERO, Ok(body))
    }

    pub fn fail(self, endpoint: Endpoint, status: u16, body: &str) -> Self {
        self.route(endpoint, None, Duration::ZERO, Err((status, body.to_string())))
    }

    /// Answers `body` for an exact query string after `delay`.
    pub fn respond_after(self, endpoint: Endpoint, query: &str, delay: Duration, body: Value) -> Self {
        self.route(endpoint, Some(query), delay, Ok(body))
    }

    /// Fails with `status` for an exact query string after `delay`.
    pub fn fail_after(
        self,
        endpoint: Endpoint,
        query: &str,
        delay: Duration,
        status: u16,
        body: &str,
    ) -> Self {
        self.route(endpoint, Some(query), delay, Err((status, body.to_string())))
    }

    /// Every call made so far, as `(endpoint, query string)`.
    pub fn calls(&self) -> Vec<(Endpoint, String)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

#[async_trait]
impl AnalyticsBackend for ScriptedBackend {
    async fn get_json(&self, endpoint: Endpoint, query: &QueryParams) -> Result<Value> {
        let query = query.to_query_string();
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((endpoint, query.clone()));

        let route = {
            let routes = self.routes.lock().expect("routes lock poisoned");
            routes
                .iter()
                .find(|r| r.endpoint == endpoint && r.query.as_deref() == Some(query.as_str()))
                .or_else(|| routes.iter().find(|r| r.endpoint == endpoint && r.query.is_none()))
                .cloned()
        };

        let Some(route) = route else {
            return Ok(Value::Null);
        };
        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }
        route
            .response
            .map_err(|(status, body)| ClientError::Transport { status, body })
    }
}
