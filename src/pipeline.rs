//! Wiring between feed subscriptions and the aggregator.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::aggregator::{Stream, TelemetryAggregator};
use crate::config::Config;
use crate::feed::{HttpFeed, Subscription};

// ---

/// Apply every delivery of `subscription` to `stream`, in arrival order,
/// until the feed shuts down.
pub async fn pump(
    stream: Stream,
    aggregator: Arc<TelemetryAggregator>,
    mut subscription: Subscription,
) {
    // ---
    let mut delivered = 0u64;
    while let Some(event) = subscription.next().await {
        delivered += 1;
        aggregator.apply(stream, event);
    }
    info!("{:?} feed closed after {} deliveries", stream, delivered);
}

/// Subscribe to the three configured paths and spawn one pump per stream.
///
/// Streams run as separate tasks so none can hold up another.
pub fn spawn(
    feed: &HttpFeed,
    config: &Config,
    aggregator: Arc<TelemetryAggregator>,
) -> Vec<JoinHandle<()>> {
    // ---
    [
        (Stream::Telemetry, config.telemetry_path.as_str()),
        (Stream::Motion, config.motion_path.as_str()),
        (Stream::Ledger, config.ledger_path.as_str()),
    ]
    .into_iter()
    .map(|(stream, path)| {
        let subscription = feed.subscribe(path);
        tokio::spawn(pump(stream, Arc::clone(&aggregator), subscription))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::feed::FeedError;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_pump_applies_in_arrival_order() {
        // ---
        let aggregator = Arc::new(TelemetryAggregator::new(10, Duration::from_secs(5)));
        let (tx, rx) = mpsc::channel(8);

        for t in [18, 19, 20] {
            tx.send(Ok(json!({"temperature": t, "humidity": 40})))
                .await
                .unwrap();
        }
        tx.send(Err(FeedError::Status {
            url: "http://store/sensors.json".to_string(),
            status: reqwest::StatusCode::BAD_GATEWAY,
        }))
        .await
        .unwrap();
        drop(tx);

        pump(
            Stream::Telemetry,
            Arc::clone(&aggregator),
            Subscription::from_receiver(rx),
        )
        .await;

        let temps: Vec<f64> = aggregator
            .window_snapshot()
            .iter()
            .map(|r| r.temperature)
            .collect();
        assert_eq!(temps, vec![18.0, 19.0, 20.0]);
        assert_eq!(aggregator.telemetry().temperature, 20.0);
        assert!(!aggregator.telemetry().loading);
    }

    #[tokio::test]
    async fn test_pump_routes_ledger_stream() {
        // ---
        let aggregator = Arc::new(TelemetryAggregator::new(10, Duration::from_secs(5)));
        let (tx, rx) = mpsc::channel(2);
        tx.send(Ok(json!({
            "quantity": 7,
            "history": {"2025-12-20_20-11-20": {"amount": 7, "ton_sau": 7}}
        })))
        .await
        .unwrap();
        drop(tx);

        pump(
            Stream::Ledger,
            Arc::clone(&aggregator),
            Subscription::from_receiver(rx),
        )
        .await;

        assert_eq!(aggregator.ledger().quantity, Some(7.0));
        assert!(aggregator.window_snapshot().is_empty());
    }
}
