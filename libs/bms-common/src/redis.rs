//! Async Redis client

use crate::error::{CommonError, Result};
use redis::aio::{ConnectionManager, PubSub};
use redis::{AsyncCommands, Client};

/// Async Redis client with a managed (auto-reconnecting) connection
pub struct RedisClient {
    client: Client,
    conn: ConnectionManager,
    url: String,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("url", &self.url)
            .field("conn", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisClient {
    /// Connect to Redis with a 5 second connection timeout
    pub async fn new(url: &str) -> Result<Self> {
        let client = Client::open(url)?;

        let conn = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            ConnectionManager::new(client.clone()),
        )
        .await
        .map_err(|_| CommonError::Redis("Redis connection timeout after 5 seconds".into()))??;

        Ok(Self {
            client,
            conn,
            url: url.into(),
        })
    }

    /// PUBLISH operation
    pub async fn publish(&mut self, channel: &str, message: &str) -> Result<u32> {
        Ok(self.conn.publish(channel, message).await?)
    }

    /// Open a dedicated pub/sub connection subscribed to the given channels
    pub async fn subscribe(&self, channels: &[&str]) -> Result<PubSub> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channels).await?;
        Ok(pubsub)
    }

    /// PING operation
    pub async fn ping(&mut self) -> Result<String> {
        let pong: String = redis::cmd("PING").query_async(&mut self.conn).await?;
        Ok(pong)
    }
}
