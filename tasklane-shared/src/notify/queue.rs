/// Queued delivery
///
/// Rendered emails are serialized to JSON and pushed onto a Redis list; a
/// separate mail worker pops and sends them. Nothing is retried here.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::NotifyError;

/// Queue message body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedEmail {
    pub html: String,
    pub subject: String,
    pub params: Value,
    pub recipients: Vec<String>,
}

/// A destination for serialized messages
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn push(&self, body: String) -> Result<(), NotifyError>;
}

/// Redis list queue (`LPUSH`)
#[derive(Clone)]
pub struct RedisQueue {
    conn: ConnectionManager,
    name: String,
}

impl RedisQueue {
    /// Connects to Redis
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Queue` if the URL is invalid or the server is unreachable
    pub async fn connect(url: &str, name: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::open(url).map_err(|e| NotifyError::Queue(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| NotifyError::Queue(e.to_string()))?;

        let name = name.into();
        tracing::info!(queue = %name, "Connected notification queue");

        Ok(Self { conn, name })
    }
}

#[async_trait]
impl MessageQueue for RedisQueue {
    async fn push(&self, body: String) -> Result<(), NotifyError> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(&self.name, body)
            .await
            .map_err(|e| NotifyError::Queue(e.to_string()))
    }
}
