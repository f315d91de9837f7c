//! Retry Scheduler — bounded attempts with a fixed backoff table.
//!
//! The delay is a pure function of the 1-based attempt number so the schedule
//! can be asserted without sleeping. Attempts are strictly sequential; the
//! delay runs before the attempt, never after, and success short-circuits.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Attempt ceiling for every remote generation call.
pub const MAX_ATTEMPTS: u32 = 10;

/// Every attempt up to the ceiling failed. Wraps the final attempt's cause
/// rather than surfacing it raw.
#[derive(Debug, Error)]
#[error("'{op}' failed after {attempts} attempts: {last_cause}")]
pub struct RetryExhausted<E: Display + Debug> {
    pub op: &'static str,
    pub attempts: u32,
    pub last_cause: E,
}

/// Delay before the given 1-based attempt: none for the first try, 5 s before
/// the first retry, 10 s before every retry after that.
pub fn backoff_delay(attempt: u32) -> Duration {
    match attempt {
        0 | 1 => Duration::ZERO,
        2 => Duration::from_millis(5_000),
        _ => Duration::from_millis(10_000),
    }
}

/// Runs `op` up to [`MAX_ATTEMPTS`] times, sleeping per [`backoff_delay`]
/// strictly before each attempt. Each failure is logged and the loop moves on;
/// the final failure comes back wrapped in [`RetryExhausted`].
pub async fn run_with_retry<T, E, F, Fut>(
    op_name: &'static str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + Debug,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let delay = backoff_delay(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(cause) => {
                warn!("'{op_name}' attempt {attempt}/{MAX_ATTEMPTS} failed: {cause}");
                if attempt == MAX_ATTEMPTS {
                    return Err(RetryExhausted {
                        op: op_name,
                        attempts: MAX_ATTEMPTS,
                        last_cause: cause,
                    });
                }
            }
        }
    }
    unreachable!("final attempt either returns or errors")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use tokio::time::Instant;

    #[test]
    fn test_backoff_table() {
        assert_eq!(backoff_delay(1), Duration::ZERO);
        assert_eq!(backoff_delay(2), Duration::from_millis(5_000));
        for attempt in 3..=MAX_ATTEMPTS {
            assert_eq!(backoff_delay(attempt), Duration::from_millis(10_000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_exhaustion_schedule() {
        // 10 attempts produce 9 delays: one 5s, eight 10s; offsets are exact.
        let start = Instant::now();
        let offsets = RefCell::new(Vec::new());

        let result: Result<(), _> = run_with_retry("op", || {
            offsets.borrow_mut().push(start.elapsed());
            async { Err("boom") }
        })
        .await;

        let offsets = offsets.into_inner();
        assert_eq!(offsets.len(), 10);
        let mut expected = Duration::ZERO;
        for (attempt, offset) in offsets.iter().enumerate() {
            expected += backoff_delay(attempt as u32 + 1);
            assert_eq!(*offset, expected, "attempt {}", attempt + 1);
        }
        assert_eq!(start.elapsed(), Duration::from_millis(85_000));

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 10);
        assert_eq!(err.last_cause, "boom");
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_short_circuits_with_no_trailing_delay() {
        for succeed_on in 1..=MAX_ATTEMPTS {
            let start = Instant::now();
            let calls = Cell::new(0u32);

            let result = run_with_retry("op", || {
                calls.set(calls.get() + 1);
                let attempt = calls.get();
                async move {
                    if attempt == succeed_on {
                        Ok(attempt)
                    } else {
                        Err("not yet")
                    }
                }
            })
            .await;

            assert_eq!(result.unwrap(), succeed_on);
            assert_eq!(calls.get(), succeed_on);

            // elapsed equals the sum of delays before attempts 1..=k, nothing after
            let expected: Duration = (1..=succeed_on).map(backoff_delay).sum();
            assert_eq!(start.elapsed(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_cause() {
        let calls = Cell::new(0u32);

        let result: Result<(), _> = run_with_retry("flaky", || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move { Err(format!("failure #{attempt}")) }
        })
        .await;

        // no 11th call, and the wrapper carries the 10th failure
        assert_eq!(calls.get(), 10);
        let err = result.unwrap_err();
        assert_eq!(err.last_cause, "failure #10");
        assert!(err.to_string().contains("'flaky' failed after 10 attempts"));
    }

    #[tokio::test]
    async fn test_first_attempt_success_sleeps_never() {
        // unpaused runtime: an immediate success must not sleep at all
        let result = run_with_retry("op", || async { Ok::<_, &str>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
