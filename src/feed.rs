//! Snapshot feed over the realtime store's REST surface.
//!
//! Each subscribed path is polled on a fixed interval and every poll yields
//! either the path's whole JSON snapshot or a [`FeedError`]. A snapshot is
//! only delivered when it differs from the previous one, which mirrors the
//! push-on-change behaviour of the store itself. The core consumes nothing
//! beyond the [`Subscription`] stream; reconnection is left to the next poll.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

// ---

/// Depth of the per-subscription delivery queue.
const QUEUE_DEPTH: usize = 16;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not decode snapshot from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// One delivery from the feed: a full snapshot, or the error that replaced it.
pub type FeedEvent = Result<Value, FeedError>;

/// Live subscription to one feed path.
///
/// Dropping it unsubscribes: the polling task is stopped.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<FeedEvent>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap an already-fed channel, e.g. a test double or another transport.
    pub fn from_receiver(rx: mpsc::Receiver<FeedEvent>) -> Self {
        Self { rx, task: None }
    }

    /// Wait for the next delivery; `None` once the feed has shut down.
    pub async fn next(&mut self) -> Option<FeedEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Polling client for `{base_url}/{path}.json` snapshots.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    base_url: String,
    interval: Duration,
}

impl HttpFeed {
    pub fn new(base_url: impl Into<String>, interval: Duration) -> Self {
        // ---
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            interval,
        }
    }

    /// URL of the JSON snapshot for a store path.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}.json",
            self.base_url.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    /// Start polling `path`. Must be called from within a Tokio runtime.
    pub fn subscribe(&self, path: &str) -> Subscription {
        // ---
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let client = self.client.clone();
        let url = self.url_for(path);
        let interval = self.interval;

        info!("Subscribing to {} every {:?}", url, interval);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last: Option<Value> = None;

            loop {
                ticker.tick().await;

                let event = match fetch_snapshot(&client, &url).await {
                    Ok(snapshot) if last.as_ref() == Some(&snapshot) => continue,
                    Ok(snapshot) => {
                        last = Some(snapshot.clone());
                        Ok(snapshot)
                    }
                    Err(e) => Err(e),
                };

                if tx.send(event).await.is_err() {
                    debug!("Subscriber for {} went away, stopping poll", url);
                    break;
                }
            }
        });

        Subscription {
            rx,
            task: Some(task),
        }
    }
}

/// Fetch one snapshot. A missing path comes back from the store as `null`.
async fn fetch_snapshot(client: &reqwest::Client, url: &str) -> Result<Value, FeedError> {
    // ---
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FeedError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            url: url.to_string(),
            status,
        });
    }

    let snapshot: Value = response.json().await.map_err(|source| FeedError::Decode {
        url: url.to_string(),
        source,
    })?;

    tracing::trace!("Snapshot from {}: {}", url, snapshot);
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_for_joins_cleanly() {
        // ---
        let feed = HttpFeed::new("https://store.example.com/", Duration::from_secs(1));
        assert_eq!(
            feed.url_for("/sensors/motion/"),
            "https://store.example.com/sensors/motion.json"
        );
        assert_eq!(
            feed.url_for("warehouse"),
            "https://store.example.com/warehouse.json"
        );
    }

    #[tokio::test]
    async fn test_subscription_from_receiver() {
        // ---
        let (tx, rx) = mpsc::channel(4);
        let mut sub = Subscription::from_receiver(rx);

        tx.send(Ok(json!({"temperature": 20}))).await.unwrap();
        drop(tx);

        let first = sub.next().await.unwrap().unwrap();
        assert_eq!(first["temperature"], 20);
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_store_yields_error() {
        // ---
        // Port 9 on loopback is reserved (discard) and not listening here.
        let feed = HttpFeed::new("http://127.0.0.1:9", Duration::from_millis(10));
        let mut sub = feed.subscribe("sensors");

        let event = sub.next().await.unwrap();
        assert!(matches!(event, Err(FeedError::Request { .. })));
    }
}
