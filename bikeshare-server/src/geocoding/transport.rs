//! HTTP transport used by geocoding providers.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use super::error::GeocodeError;

/// Identifying User-Agent; public geocoders reject anonymous clients.
pub const DEFAULT_USER_AGENT: &str = "BikeshareDashboard/1.0 (bikeshare.dashboard@app.local)";

/// A GET request described as an endpoint plus query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub url: String,
    pub query: Vec<(&'static str, String)>,
}

impl ProviderRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter.
    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Look up a query parameter by name.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Performs a request and returns the parsed JSON body.
///
/// This abstraction allows the provider chain to be tested without a network.
pub trait Transport: Send + Sync + 'static {
    fn get_json(
        &self,
        request: &ProviderRequest,
    ) -> impl Future<Output = Result<Value, GeocodeError>> + Send;
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl HttpTransportConfig {
    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, request: &ProviderRequest) -> Result<Value, GeocodeError> {
        let response = self
            .http
            .get(&request.url)
            .query(&request.query)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
            message: e.to_string(),
        })
    }
}
