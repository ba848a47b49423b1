use crate::domain::model::{Estimate, VehicleQuery};
use crate::domain::ports::{ConfigProvider, Estimator};
use crate::utils::error::{CarPredictError, EstimatorFailure, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Calls a model-serving endpoint with the parsed vehicle as JSON.
#[derive(Debug, Clone)]
pub struct HttpEstimator {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpEstimator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Self::with_headers(endpoint, timeout, HeaderMap::new())
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let endpoint = config.endpoint().ok_or_else(|| CarPredictError::ConfigError {
            message: "no estimator endpoint configured".to_string(),
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in config.headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CarPredictError::InvalidConfigValueError {
                    field: "estimator.headers".to_string(),
                    value: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                CarPredictError::InvalidConfigValueError {
                    field: format!("estimator.headers.{}", name),
                    value: "<redacted>".to_string(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(header_name, header_value);
        }

        Self::with_headers(endpoint, config.timeout(), headers)
    }

    fn with_headers(endpoint: &str, timeout: Duration, headers: HeaderMap) -> Result<Self> {
        crate::utils::validation::validate_url("estimator.endpoint", endpoint)?;
        let endpoint = Url::parse(endpoint).map_err(|e| CarPredictError::ConfigError {
            message: format!("invalid estimator endpoint: {}", e),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CarPredictError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Estimator for HttpEstimator {
    async fn estimate(&self, query: &VehicleQuery) -> std::result::Result<Estimate, EstimatorFailure> {
        let spec = query.parse()?;

        tracing::debug!("Making estimation request to: {}", self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&spec)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        tracing::debug!("Estimator response status: {}", response.status());
        if !response.status().is_success() {
            return Err(EstimatorFailure::Status {
                code: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport_failure(e))?;
        let estimate: Estimate = serde_json::from_slice(&body)
            .map_err(|e| EstimatorFailure::malformed(e.to_string()))?;
        estimate.checked()
    }

    fn name(&self) -> &str {
        "http"
    }
}

impl HttpEstimator {
    fn transport_failure(&self, err: reqwest::Error) -> EstimatorFailure {
        if err.is_timeout() {
            EstimatorFailure::Timeout {
                after: self.timeout,
            }
        } else {
            EstimatorFailure::from(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(HttpEstimator::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpEstimator::new("ftp://example.com", Duration::from_secs(1)).is_err());
        assert!(HttpEstimator::new("https://example.com/predict", Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_query_never_reaches_server() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/predict");
                then.status(200).json_body(serde_json::json!({"price": 1.0}));
            })
            .await;

        let estimator =
            HttpEstimator::new(&server.url("/predict"), Duration::from_secs(5)).unwrap();
        let query = VehicleQuery {
            mileage: Some("many".to_string()),
            ..Default::default()
        };

        let result = estimator.estimate(&query).await;
        assert!(matches!(
            result,
            Err(EstimatorFailure::InvalidQuery { ref field, .. }) if field == "mileage"
        ));
        api_mock.assert_hits_async(0).await;
    }
}
