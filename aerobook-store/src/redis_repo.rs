use redis::{AsyncCommands, RedisResult};
use tracing::debug;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window counter. Returns `true` while the caller is within `limit`
    /// requests for the current window.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let count: i64 = conn.incr(key, 1).await?;
        if count == 1 {
            // The window starts with the first request and is not extended by later ones.
            let _: () = conn.expire(key, window_seconds).await?;
        }
        if count > limit {
            debug!(key, count, limit, "Rate limit exceeded");
        }

        Ok(count <= limit)
    }
}
