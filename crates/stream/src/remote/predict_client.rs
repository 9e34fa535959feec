use std::env;

use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use common::error::AdvisorError;
use common::models::Asset;

/// Payload of a successful `GET /predict`. Older service revisions answer
/// with `action` instead of `signal`; both are accepted.
#[derive(Debug, Deserialize)]
pub struct PredictionResponse {
    pub asset: String,
    pub date: String,
    #[serde(alias = "action")]
    pub signal: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub prediction: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

/// Thin client for the remote prediction service. The endpoint is external
/// configuration, not part of the core contract.
#[derive(Clone)]
pub struct PredictClient {
    client: Client,
    base_url: String,
}

impl PredictClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Built from `PREDICT_API_URL` when set; the remote service is optional.
    pub fn from_env() -> Option<Self> {
        env::var("PREDICT_API_URL").ok().map(Self::new)
    }

    pub async fn get_prediction(
        &self,
        asset: Asset,
        date: &str,
    ) -> Result<PredictionResponse, AdvisorError> {
        let url = format!("{}/predict", self.base_url.trim_end_matches('/'));

        let resp = self
            .client
            .get(&url)
            .query(&[("asset", asset.to_string()), ("date", date.to_string())])
            .send()
            .await
            .map_err(|e| AdvisorError::UpstreamUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            // Surface the upstream error text verbatim when it parses,
            // otherwise a generic retry-later message.
            let detail = match resp.json::<ErrorPayload>().await {
                Ok(payload) => payload.error,
                Err(_) => "could not fetch prediction data, try again later".to_string(),
            };
            error!("Prediction request failed: {}", detail);
            return Err(AdvisorError::UpstreamUnavailable(detail));
        }

        resp.json::<PredictionResponse>()
            .await
            .map_err(|e| AdvisorError::UpstreamUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_accepts_signal_or_action_key() {
        let with_signal: PredictionResponse = serde_json::from_str(
            r#"{"asset":"Solana","date":"2024-01-15","signal":"Buy","current_price":98.5,"prediction":104.2}"#,
        )
        .unwrap();
        assert_eq!(with_signal.signal, "Buy");
        assert_eq!(with_signal.current_price, Some(98.5));

        let with_action: PredictionResponse = serde_json::from_str(
            r#"{"asset":"Bitcoin","date":"2024-01-15","action":"Hold","message":"sideways"}"#,
        )
        .unwrap();
        assert_eq!(with_action.signal, "Hold");
        assert_eq!(with_action.message.as_deref(), Some("sideways"));
        assert_eq!(with_action.prediction, None);
    }
}
