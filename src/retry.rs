//! Bounded retry: run an operation up to N times, collecting distinct failures.
//!
//! ## Why a combinator, not a loop at the call site?
//!
//! Transient renderer failures (a busy browser process, a navigation that
//! timed out under load) are expected and should not fail a conversion on
//! the first hit. The retry logic itself has nothing to do with HTML or
//! PDF, so it lives here as a generic primitive: any `async` operation,
//! any error type, any transience predicate.
//!
//! ## Distinct-by-message aggregation
//!
//! A browser that is wedged tends to fail the same way N times in a row.
//! Accumulating a failure only when no previously recorded failure has the
//! same `Display` text keeps the final aggregate small and representative —
//! two distinct causes, not `max_attempts` copies of one.
//!
//! ## The delay is awaited
//!
//! The optional inter-attempt interval is a real `tokio::time::sleep(..).await`
//! suspension point. An earlier incarnation of this logic scheduled the delay
//! without awaiting it, which made every attempt fire back-to-back.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Options for [`execute`].
#[derive(Debug, Clone, Copy)]
pub struct RetryOptions {
    /// Maximum number of attempts, including the first. Must be ≥ 1.
    pub max_attempts: u32,
    /// Optional delay awaited between attempts. `None` retries immediately.
    pub interval: Option<Duration>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            interval: None,
        }
    }
}

impl RetryOptions {
    /// Options with the given attempt bound and no inter-attempt delay.
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Set the delay awaited between attempts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

/// Outcome of an exhausted or aborted retry sequence.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The operation failed with an error the predicate did not classify as
    /// transient; no further attempts were made.
    Fatal(E),
    /// All attempts failed. `causes` holds every distinct failure observed,
    /// deduplicated by message text, in first-seen order.
    Exhausted { attempts: u32, causes: Vec<E> },
}

/// Run `op` up to `options.max_attempts` times.
///
/// * The first `Ok` returns immediately; accumulated failures are discarded.
/// * An error for which `is_transient` returns `false` aborts the sequence
///   at once with [`RetryError::Fatal`].
/// * Transient errors are accumulated (distinct by `Display` text). When
///   the attempt bound is hit, [`RetryError::Exhausted`] wraps them all.
/// * `options.interval`, when set, is awaited before each retry.
pub async fn execute<T, E, Op, Fut, Pred>(
    mut op: Op,
    options: RetryOptions,
    is_transient: Pred,
) -> Result<T, RetryError<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    Pred: Fn(&E) -> bool,
{
    let max_attempts = options.max_attempts.max(1);
    let mut causes: Vec<E> = Vec::new();

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            if let Some(interval) = options.interval {
                sleep(interval).await;
            }
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !is_transient(&e) => return Err(RetryError::Fatal(e)),
            Err(e) => {
                warn!(attempt, max_attempts, error = %e, "attempt failed");
                let msg = e.to_string();
                if !causes.iter().any(|c| c.to_string() == msg) {
                    causes.push(e);
                }
            }
        }
    }

    Err(RetryError::Exhausted {
        attempts: max_attempts,
        causes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn always_transient<E>(_: &E) -> bool {
        true
    }

    #[tokio::test]
    async fn succeeds_after_failures_and_discards_them() {
        let calls = AtomicU32::new(0);
        let result = execute(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(format!("failure {n}"))
                } else {
                    Ok(42)
                }
            },
            RetryOptions::attempts(5),
            always_transient,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn alternating_messages_dedupe_to_two_causes() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = execute(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Err("connection refused".to_string())
                } else {
                    Err("tab crashed".to_string())
                }
            },
            RetryOptions::attempts(5),
            always_transient,
        )
        .await;

        match result.unwrap_err() {
            RetryError::Exhausted { attempts, causes } => {
                assert_eq!(attempts, 5);
                assert_eq!(causes.len(), 2, "expected 2 distinct causes, got {causes:?}");
                assert_eq!(causes[0], "connection refused");
                assert_eq!(causes[1], "tab crashed");
            }
            RetryError::Fatal(e) => panic!("unexpected fatal: {e}"),
        }
    }

    #[tokio::test]
    async fn fatal_error_aborts_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = execute(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("bad target".to_string())
            },
            RetryOptions::attempts(5),
            |e: &String| e != "bad target",
        )
        .await;

        assert!(matches!(result, Err(RetryError::Fatal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_is_awaited_between_attempts() {
        let start = Instant::now();
        let result: Result<(), _> = execute(
            || async { Err("still failing".to_string()) },
            RetryOptions::attempts(3).with_interval(Duration::from_millis(100)),
            always_transient,
        )
        .await;

        assert!(matches!(result, Err(RetryError::Exhausted { .. })));
        // 3 attempts → 2 intervals. Paused time makes this exact.
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn single_attempt_bound_is_respected() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = execute(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("nope".to_string())
            },
            RetryOptions::attempts(1),
            always_transient,
        )
        .await;

        assert!(matches!(
            result,
            Err(RetryError::Exhausted { attempts: 1, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
