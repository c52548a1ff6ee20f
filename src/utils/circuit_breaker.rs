use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Trips after a run of consecutive failures and rejects calls for a cooldown
// period, then lets a probe call through to test recovery.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls pass through.
    Closed,
    /// Calls are rejected until the cooldown elapses.
    Open,
    /// Cooldown elapsed; the next call probes the downstream service.
    HalfOpen,
}

#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E> {
    #[error("circuit open, call rejected")]
    Open,

    #[error("{0}")]
    Inner(E),
}

struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
            failure_threshold,
            cooldown,
        }
    }

    pub async fn state(&self) -> BreakerState {
        self.inner.lock().await.state
    }

    /// Run `operation` unless the circuit is open. A success closes the
    /// circuit; a failure in the half-open probe reopens it immediately.
    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        {
            let mut inner = self.inner.lock().await;
            if inner.state == BreakerState::Open {
                let cooled_down = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.cooldown)
                    .unwrap_or(true);
                if !cooled_down {
                    return Err(BreakerError::Open);
                }
                tracing::info!("Circuit breaker half-open, probing");
                inner.state = BreakerState::HalfOpen;
            }
        }

        match operation.await {
            Ok(result) => {
                let mut inner = self.inner.lock().await;
                if inner.state != BreakerState::Closed {
                    tracing::info!("Circuit breaker closed");
                }
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                Ok(result)
            }
            Err(err) => {
                let mut inner = self.inner.lock().await;
                inner.consecutive_failures += 1;
                let tripped = inner.state == BreakerState::HalfOpen
                    || inner.consecutive_failures >= self.failure_threshold;
                if tripped {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                    tracing::warn!(
                        failures = inner.consecutive_failures,
                        "Circuit breaker opened"
                    );
                }
                Err(BreakerError::Inner(err))
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
