use std::sync::Arc;

use tokio::sync::broadcast;

/// Fan-out point for emitted log lines: one producer, N independent
/// subscribers. Delivery is at-most-once and in emission order per
/// subscriber; there is no replay, so a subscriber only sees lines emitted
/// after it subscribed.
#[derive(Clone)]
pub struct LogPublisher {
    tx: broadcast::Sender<Arc<str>>,
}

impl LogPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emits one line to every currently-open subscriber. Never blocks and
    /// never fails: with no subscribers the line is simply dropped.
    /// Returns the number of subscribers the line was handed to.
    pub fn publish(&self, line: &str) -> usize {
        self.tx.send(Arc::from(line)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_subscriber_sees_lines_in_order() {
        let publisher = LogPublisher::new(16);
        let mut rx = publisher.subscribe();

        publisher.publish("L1");
        publisher.publish("L2");
        publisher.publish("L3");

        assert_eq!(&*rx.recv().await.unwrap(), "L1");
        assert_eq!(&*rx.recv().await.unwrap(), "L2");
        assert_eq!(&*rx.recv().await.unwrap(), "L3");
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_lines() {
        let publisher = LogPublisher::new(16);
        let mut early = publisher.subscribe();

        publisher.publish("L1");
        let mut late = publisher.subscribe();
        publisher.publish("L2");
        publisher.publish("L3");

        assert_eq!(&*early.recv().await.unwrap(), "L1");
        assert_eq!(&*early.recv().await.unwrap(), "L2");
        assert_eq!(&*early.recv().await.unwrap(), "L3");

        assert_eq!(&*late.recv().await.unwrap(), "L2");
        assert_eq!(&*late.recv().await.unwrap(), "L3");
    }

    #[tokio::test]
    async fn dropped_subscriber_does_not_affect_others() {
        let publisher = LogPublisher::new(16);
        let gone = publisher.subscribe();
        let mut alive = publisher.subscribe();

        drop(gone);
        publisher.publish("L1");

        assert_eq!(&*alive.recv().await.unwrap(), "L1");
        assert_eq!(publisher.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let publisher = LogPublisher::new(16);
        assert_eq!(publisher.publish("L1"), 0);
    }
}
