use std::sync::Arc;

use tracing::info;

use common::error::AdvisorError;
use common::models::{Asset, PredictionLog};
use storage::LogStore;
use stream::{LogPublisher, PredictClient, PredictionResponse};

/// The caller-side prediction flow: validate, compute the deterministic
/// signal, record it, and push the log line to live subscribers.
pub struct PredictionService {
    store: Arc<LogStore>,
    publisher: LogPublisher,
    remote: Option<PredictClient>,
}

impl PredictionService {
    pub fn new(store: Arc<LogStore>, publisher: LogPublisher) -> Self {
        Self {
            store,
            publisher,
            remote: None,
        }
    }

    pub fn with_remote(mut self, client: PredictClient) -> Self {
        self.remote = Some(client);
        self
    }

    /// Issues a prediction for `date`. An empty date is rejected before any
    /// computation or store write happens.
    pub async fn predict(&self, date: &str) -> Result<PredictionLog, AdvisorError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(AdvisorError::InvalidInput(
                "a date is required".to_string(),
            ));
        }

        let signal = signal::compute(date).map_err(|e| AdvisorError::InvalidInput(e.to_string()))?;

        let log = PredictionLog::new(date, signal.action, signal.message);
        self.store.upsert(log.clone()).await;

        let delivered = self.publisher.publish(&log.to_line());
        info!(
            "Prediction for {}: {} ({} subscribers notified)",
            log.date, log.action, delivered
        );

        Ok(log)
    }

    /// Asks the remote prediction service for a price-backed forecast.
    /// Upstream error text is passed through verbatim.
    pub async fn quote(
        &self,
        asset: Asset,
        date: &str,
    ) -> Result<PredictionResponse, AdvisorError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(AdvisorError::InvalidInput(
                "a date is required".to_string(),
            ));
        }

        let client = self.remote.as_ref().ok_or_else(|| {
            AdvisorError::UpstreamUnavailable("no prediction service configured".to_string())
        })?;
        client.get_prediction(asset, date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::TradeAction;
    use storage::MemoryPersistence;

    async fn service_with_publisher() -> (PredictionService, LogPublisher, Arc<LogStore>) {
        let store = Arc::new(LogStore::open(Arc::new(MemoryPersistence::new())).await);
        let publisher = LogPublisher::new(16);
        let service = PredictionService::new(store.clone(), publisher.clone());
        (service, publisher, store)
    }

    #[tokio::test]
    async fn predict_records_and_publishes() {
        let (service, publisher, store) = service_with_publisher().await;
        let mut rx = publisher.subscribe();

        let log = service.predict("2024-01-15").await.unwrap();
        assert_eq!(log.action, TradeAction::Buy);

        let all = store.list_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], log);

        let line = rx.recv().await.unwrap();
        assert_eq!(&*line, log.to_line());
    }

    #[tokio::test]
    async fn repeat_prediction_replaces_by_date() {
        let (service, _publisher, store) = service_with_publisher().await;

        let first = service.predict("2024-01-15").await.unwrap();
        let second = service.predict("2024-01-15").await.unwrap();

        let all = store.list_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].timestamp, second.timestamp);
        // Same date, same deterministic signal.
        assert_eq!(first.action, second.action);
    }

    #[tokio::test]
    async fn empty_date_is_rejected_without_a_store_write() {
        let (service, _publisher, store) = service_with_publisher().await;

        for bad in ["", "   "] {
            let err = service.predict(bad).await.unwrap_err();
            assert!(matches!(err, AdvisorError::InvalidInput(_)));
        }
        assert!(store.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn quote_without_remote_is_upstream_unavailable() {
        let (service, _publisher, _store) = service_with_publisher().await;

        let err = service.quote(Asset::Solana, "2024-01-15").await.unwrap_err();
        assert!(matches!(err, AdvisorError::UpstreamUnavailable(_)));
    }
}
