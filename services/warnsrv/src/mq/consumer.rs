//! Signal consumer
//!
//! Subscribes to the signal channel and forwards every delivered identifier
//! to the warning generator. Processing errors are logged and left to the
//! transport's redelivery policy; there is no internal retry loop here.

use crate::mq::SignalMessage;
use crate::services::WarningGenerator;
use anyhow::Result;
use bms_common::RedisClient;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Spawn the consumer loop.
///
/// Reconnects with a fixed 5 second backoff when the subscription drops.
pub fn start_signal_consumer(
    redis_url: String,
    channel: String,
    generator: Arc<WarningGenerator>,
) {
    tokio::spawn(async move {
        loop {
            match connect_and_listen(&redis_url, &channel, &generator).await {
                Ok(()) => warn!("Signal subscription ended, reconnecting"),
                Err(e) => error!("Signal consumer connection failed: {}", e),
            }
            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
        }
    });
}

async fn connect_and_listen(
    redis_url: &str,
    channel: &str,
    generator: &Arc<WarningGenerator>,
) -> Result<()> {
    let client = RedisClient::new(redis_url).await?;
    let pubsub = client.subscribe(&[channel]).await?;
    info!("Signal consumer subscribed to {}", channel);

    let mut stream = pubsub.into_on_message();
    while let Some(msg) = stream.next().await {
        let Ok(payload) = msg.get_payload::<String>() else {
            warn!("Dropping non-text message on {}", channel);
            continue;
        };

        if let Err(e) = process_message(generator, &payload).await {
            // Leave retrying to the transport's own redelivery policy
            error!("Failed to process signal message {}: {}", payload, e);
        }
    }

    Ok(())
}

async fn process_message(generator: &Arc<WarningGenerator>, payload: &str) -> Result<()> {
    let message: SignalMessage = serde_json::from_str(payload)?;
    info!("Consuming signal {}", message.signal_id);

    // AlreadyProcessed is a normal outcome under at-least-once delivery
    generator.generate(message.signal_id).await?;
    Ok(())
}
