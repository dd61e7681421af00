//! Circuit breaker guarding calls to a single expert.
//!
//! Three states: CLOSED (calls pass through), OPEN (calls rejected until the
//! recovery timeout elapses), HALF_OPEN (one probing attempt after the
//! timeout). Fixed failure threshold and fixed recovery timeout — no jitter,
//! no exponential backoff. Any success closes the breaker and clears the
//! failure count; a HALF_OPEN failure re-opens it through the same counter
//! branch as CLOSED.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::warn;

use crate::config::BreakerConfig;
use crate::experts::ExpertError;
use crate::types::{BreakerStatus, CircuitState};

/// Mutable breaker state, guarded by one lock.
#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: usize,
    next_retry_time: Option<Instant>,
}

/// Per-expert circuit breaker.
///
/// Owned exclusively by the expert's handle; state is behind an async lock
/// so concurrent scoring passes can share the breaker safely.
pub struct CircuitBreaker {
    expert_name: String,
    failure_threshold: usize,
    recovery_timeout: Duration,
    state: RwLock<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(expert_name: impl Into<String>, config: &BreakerConfig) -> Self {
        Self {
            expert_name: expert_name.into(),
            failure_threshold: config.failure_threshold,
            recovery_timeout: config.recovery_timeout(),
            state: RwLock::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                next_retry_time: None,
            }),
        }
    }

    /// Run `operation` through the breaker.
    ///
    /// While OPEN and before the retry time, the operation is never invoked
    /// and a [`ExpertError::BreakerOpen`] rejection is returned immediately.
    /// Once the retry time has passed the breaker moves to HALF_OPEN and the
    /// call is attempted.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ExpertError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ExpertError>>,
    {
        self.admit().await?;

        match operation().await {
            Ok(value) => {
                self.on_success().await;
                Ok(value)
            }
            Err(err) => {
                self.on_failure().await;
                Err(err)
            }
        }
    }

    /// Gate a call: reject while OPEN, move to HALF_OPEN once the retry time
    /// has passed.
    async fn admit(&self) -> Result<(), ExpertError> {
        let mut state = self.state.write().await;
        if state.state == CircuitState::Open {
            let now = Instant::now();
            match state.next_retry_time {
                Some(retry_at) if now < retry_at => {
                    return Err(ExpertError::BreakerOpen {
                        expert: self.expert_name.clone(),
                        retry_in_ms: (retry_at - now).as_millis() as u64,
                    });
                }
                _ => state.state = CircuitState::HalfOpen,
            }
        }
        Ok(())
    }

    async fn on_success(&self) {
        let mut state = self.state.write().await;
        state.state = CircuitState::Closed;
        state.failure_count = 0;
        state.next_retry_time = None;
    }

    async fn on_failure(&self) {
        let mut state = self.state.write().await;
        state.failure_count += 1;
        // In HALF_OPEN the count is already at the threshold, so the same
        // branch re-opens the breaker with a fresh retry time.
        if state.failure_count >= self.failure_threshold {
            state.state = CircuitState::Open;
            state.next_retry_time = Some(Instant::now() + self.recovery_timeout);
            warn!(
                expert = %self.expert_name,
                failures = state.failure_count,
                "🚨 Circuit breaker opened"
            );
        }
    }

    /// Current state of the breaker.
    pub async fn current_state(&self) -> CircuitState {
        self.state.read().await.state
    }

    /// Serializable snapshot for health reports.
    pub async fn status(&self) -> BreakerStatus {
        let state = self.state.read().await;
        let now = Instant::now();
        BreakerStatus {
            expert: self.expert_name.clone(),
            state: state.state,
            failure_count: state.failure_count,
            is_healthy: state.state == CircuitState::Closed,
            next_retry_in_ms: state
                .next_retry_time
                .map(|t| t.saturating_duration_since(now).as_millis() as u64),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn breaker(threshold: usize, timeout_ms: u64) -> CircuitBreaker {
        CircuitBreaker::new(
            "test expert",
            &BreakerConfig {
                failure_threshold: threshold,
                recovery_timeout_ms: timeout_ms,
            },
        )
    }

    #[tokio::test]
    async fn test_closed_passes_through() {
        let cb = breaker(5, 60_000);
        assert_eq!(cb.current_state().await, CircuitState::Closed);

        let result = cb.execute(|| async { Ok::<_, ExpertError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(cb.current_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_opens_at_threshold() {
        let cb = breaker(3, 60_000);

        for _ in 0..2 {
            let _: Result<(), _> = cb
                .execute(|| async { Err(ExpertError::Failed("boom".to_string())) })
                .await;
            assert_eq!(cb.current_state().await, CircuitState::Closed);
        }

        let _: Result<(), _> = cb
            .execute(|| async { Err(ExpertError::Failed("boom".to_string())) })
            .await;
        assert_eq!(cb.current_state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_open_rejects_without_invoking() {
        let cb = breaker(2, 60_000);
        let invocations = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let counter = Arc::clone(&invocations);
            let _: Result<(), _> = cb
                .execute(|| async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ExpertError::Failed("boom".to_string()))
                })
                .await;
        }
        assert_eq!(invocations.load(Ordering::SeqCst), 2);

        let counter = Arc::clone(&invocations);
        let result: Result<(), _> = cb
            .execute(|| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ExpertError::BreakerOpen { .. })));
        // The wrapped operation never ran
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let cb = breaker(3, 60_000);

        for _ in 0..2 {
            let _: Result<(), _> = cb
                .execute(|| async { Err(ExpertError::Failed("boom".to_string())) })
                .await;
        }
        let _ = cb.execute(|| async { Ok::<_, ExpertError>(()) }).await;
        assert_eq!(cb.status().await.failure_count, 0);

        // Two more failures do not reach the threshold again
        for _ in 0..2 {
            let _: Result<(), _> = cb
                .execute(|| async { Err(ExpertError::Failed("boom".to_string())) })
                .await;
        }
        assert_eq!(cb.current_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_after_recovery_timeout() {
        let cb = breaker(2, 100);

        for _ in 0..2 {
            let _: Result<(), _> = cb
                .execute(|| async { Err(ExpertError::Failed("boom".to_string())) })
                .await;
        }
        assert_eq!(cb.current_state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(150)).await;

        // The next call is attempted rather than rejected, and its success
        // closes the breaker
        let result = cb.execute(|| async { Ok::<_, ExpertError>("recovered") }).await;
        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(cb.current_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let cb = breaker(2, 100);

        for _ in 0..2 {
            let _: Result<(), _> = cb
                .execute(|| async { Err(ExpertError::Failed("boom".to_string())) })
                .await;
        }
        tokio::time::sleep(Duration::from_millis(150)).await;

        // The probing attempt fails — breaker re-opens with a fresh timeout
        let _: Result<(), _> = cb
            .execute(|| async { Err(ExpertError::Failed("still broken".to_string())) })
            .await;
        assert_eq!(cb.current_state().await, CircuitState::Open);

        let result: Result<(), _> = cb.execute(|| async { Ok(()) }).await;
        assert!(matches!(result, Err(ExpertError::BreakerOpen { .. })));
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let cb = breaker(1, 60_000);
        let _: Result<(), _> = cb
            .execute(|| async { Err(ExpertError::Failed("boom".to_string())) })
            .await;

        let status = cb.status().await;
        assert_eq!(status.expert, "test expert");
        assert_eq!(status.state, CircuitState::Open);
        assert_eq!(status.failure_count, 1);
        assert!(!status.is_healthy);
        assert!(status.next_retry_in_ms.is_some());
    }
}
