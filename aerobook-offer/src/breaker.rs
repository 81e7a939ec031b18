use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing fast
    HalfOpen, // Probing whether the provider is back
}

/// Guards calls to an external provider. After `threshold` consecutive
/// failures the provider is skipped until `reset_timeout` has passed.
pub struct CircuitBreaker {
    pub name: String,
    state: RwLock<CircuitState>,
    failure_count: AtomicUsize,
    failure_threshold: usize,
    reset_timeout: Duration,
    last_failure: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, reset_timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            failure_threshold: threshold.max(1),
            reset_timeout,
            last_failure: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Whether a call may go through right now.
    pub async fn check(&self) -> bool {
        let state = *self.state.read().await;
        match state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let last_fail = *self.last_failure.read().await;
                match last_fail {
                    Some(at) if at.elapsed() >= self.reset_timeout => {
                        *self.state.write().await = CircuitState::HalfOpen;
                        tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::HalfOpen {
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::SeqCst);
    }

    pub async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;

        if count >= self.failure_threshold || *state == CircuitState::HalfOpen {
            *state = CircuitState::Open;
            *self.last_failure.write().await = Some(Instant::now());
            tracing::warn!("Circuit Breaker [{}] tripped to Open after {} failures", self.name, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_opens_after_threshold() {
        let cb = CircuitBreaker::new("provider", 3, Duration::from_secs(30));

        cb.record_failure().await;
        cb.record_failure().await;
        assert!(cb.check().await);

        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);
        assert!(!cb.check().await);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let cb = CircuitBreaker::new("provider", 2, Duration::from_secs(30));

        cb.record_failure().await;
        cb.record_success().await;
        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_probe() {
        let cb = CircuitBreaker::new("provider", 1, Duration::from_millis(20));
        cb.record_failure().await;
        assert!(!cb.check().await);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cb.check().await);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        // A failed probe reopens immediately.
        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cb.check().await);
        cb.record_success().await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }
}
