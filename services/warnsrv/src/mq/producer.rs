//! Signal producer
//!
//! Publishes the identifier of a freshly persisted signal. A publish failure
//! never propagates: the signal is already committed and ingestion considers
//! itself successful regardless of the transport outcome.

use crate::config::WarnsrvConfig;
use crate::mq::SignalMessage;
use bms_common::RedisClient;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct SignalProducer {
    enabled: bool,
    channel: String,
    redis_url: String,
    client: Mutex<Option<RedisClient>>,
}

impl SignalProducer {
    pub fn new(config: &WarnsrvConfig) -> Self {
        Self {
            enabled: config.mq.enabled,
            channel: config.mq.channel.clone(),
            redis_url: config.redis.url.clone(),
            client: Mutex::new(None),
        }
    }

    /// Publish a signal id for asynchronous processing.
    ///
    /// Connects lazily and drops a broken connection so the next send
    /// reconnects.
    pub async fn send(&self, signal_id: i64) {
        if !self.enabled {
            debug!("MQ publishing disabled, signal {} not sent to queue", signal_id);
            return;
        }

        let message = match serde_json::to_string(&SignalMessage { signal_id }) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to serialize signal message {}: {}", signal_id, e);
                return;
            },
        };

        let mut guard = self.client.lock().await;

        if guard.is_none() {
            match RedisClient::new(&self.redis_url).await {
                Ok(client) => *guard = Some(client),
                Err(e) => {
                    warn!(
                        "Failed to publish signal {} (continuing anyway): {}",
                        signal_id, e
                    );
                    return;
                },
            }
        }

        if let Some(client) = guard.as_mut() {
            match client.publish(&self.channel, &message).await {
                Ok(_) => info!("Signal {} published to {}", signal_id, self.channel),
                Err(e) => {
                    warn!(
                        "Failed to publish signal {} (continuing anyway): {}",
                        signal_id, e
                    );
                    *guard = None;
                },
            }
        }
    }
}

impl std::fmt::Debug for SignalProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalProducer")
            .field("enabled", &self.enabled)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
