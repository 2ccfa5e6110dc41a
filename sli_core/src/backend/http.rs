use super::{MetricDatum, MetricsBackend, StatisticsRequest};
use crate::error::BackendError;
use crate::metric::Datapoint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct StatisticsResponse {
    #[serde(default, alias = "Datapoints")]
    datapoints: Vec<Datapoint>,
}

#[derive(Debug, Serialize)]
struct PutMetricDataRequest<'a> {
    namespace: &'a str,
    metric_data: [&'a MetricDatum; 1],
}

/// Client for a metrics gateway speaking JSON over HTTP.
///
/// `POST {base}/statistics` answers with `{"datapoints": [...]}`;
/// `POST {base}/metric-data` accepts `{"namespace", "metric_data": [...]}`.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, BackendError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                code: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Transport(err.to_string())
    }
}

#[async_trait]
impl MetricsBackend for HttpBackend {
    async fn get_metric_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<Vec<Datapoint>, BackendError> {
        let response = self.post("statistics", request).await?;
        let body = response.text().await.map_err(transport_error)?;
        let parsed: StatisticsResponse =
            serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(parsed.datapoints)
    }

    async fn put_metric_data(
        &self,
        namespace: &str,
        datum: &MetricDatum,
    ) -> Result<(), BackendError> {
        let body = PutMetricDataRequest {
            namespace,
            metric_data: [datum],
        };
        self.post("metric-data", &body).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
