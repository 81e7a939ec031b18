use std::time::Duration;

use aerobook_core::supplier::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Tokens are refreshed this long before the provider says they expire.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// OAuth2 client-credentials grant response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<AccessToken, ProviderError>;
}

struct Cached {
    token: String,
    refresh_at: Instant,
}

/// Single cached bearer token. Concurrent callers wait on the same refresh
/// instead of each requesting a new token.
pub struct TokenCache {
    slot: Mutex<Option<Cached>>,
    margin: Duration,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_margin(REFRESH_MARGIN)
    }

    pub fn with_margin(margin: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            margin,
        }
    }

    pub async fn get_or_refresh<S>(&self, source: &S) -> Result<String, ProviderError>
    where
        S: TokenSource + ?Sized,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.token.clone());
            }
        }

        let fresh = source.fetch_token().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(self.margin);
        debug!(lifetime_secs = lifetime.as_secs(), "Provider access token refreshed");

        *slot = Some(Cached {
            token: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }

    /// Drop the cached token, e.g. after the provider rejected it.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        expires_in: u64,
    }

    impl CountingSource {
        fn new(expires_in: u64) -> Self {
            Self { calls: AtomicUsize::new(0), expires_in }
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch_token(&self) -> Result<AccessToken, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken {
                access_token: format!("token-{}", n),
                expires_in: self.expires_in,
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TokenSource for FailingSource {
        async fn fetch_token(&self) -> Result<AccessToken, ProviderError> {
            Err(ProviderError::Authentication("bad credentials".to_string()))
        }
    }

    #[tokio::test]
    async fn test_token_reused_until_refresh_margin() {
        let cache = TokenCache::new();
        let source = CountingSource::new(1799);

        assert_eq!(cache.get_or_refresh(&source).await.unwrap(), "token-1");
        assert_eq!(cache.get_or_refresh(&source).await.unwrap(), "token-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        cache.invalidate().await;
        assert_eq!(cache.get_or_refresh(&source).await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn test_short_lived_token_is_not_cached() {
        // Lifetime shorter than the margin: every call refreshes.
        let cache = TokenCache::new();
        let source = CountingSource::new(30);

        cache.get_or_refresh(&source).await.unwrap();
        cache.get_or_refresh(&source).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let cache = TokenCache::new();
        let err = cache.get_or_refresh(&FailingSource).await.unwrap_err();
        assert!(matches!(err, ProviderError::Authentication(_)));
    }
}
