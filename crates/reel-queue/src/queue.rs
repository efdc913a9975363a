//! FIFO job queue over a Redis list.

use std::time::Duration;

use redis::AsyncCommands;
use tracing::debug;

use crate::error::QueueResult;

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// List key job ids are pushed to
    pub queue_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            queue_name: "reel:jobs".to_string(),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            queue_name: std::env::var("QUEUE_NAME").unwrap_or_else(|_| "reel:jobs".to_string()),
        }
    }
}

/// Job queue client.
pub struct JobQueue {
    client: redis::Client,
    config: QueueConfig,
}

impl JobQueue {
    /// Create a new job queue.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    /// Push a job id onto the queue. Called by the producer only after
    /// the catalog row is durably written.
    pub async fn push(&self, job_id: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.lpush::<_, _, ()>(&self.config.queue_name, job_id).await?;
        debug!(job_id = %job_id, queue = %self.config.queue_name, "Enqueued job");
        Ok(())
    }

    /// Blocking pop with a bounded timeout.
    ///
    /// Returns `Ok(None)` on timeout (empty, not an error) so the worker
    /// can re-enter its supervision loop and observe cancellation.
    pub async fn pop(&self, timeout: Duration) -> QueueResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let res: Option<(String, String)> = conn
            .brpop(&self.config.queue_name, timeout.as_secs_f64())
            .await?;

        Ok(res.map(|(_, job_id)| job_id))
    }

    /// Current queue depth.
    pub async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.llen(&self.config.queue_name).await?;
        Ok(len)
    }
}
