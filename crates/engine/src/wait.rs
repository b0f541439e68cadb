//! Bounded polling waits

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Poll `probe` every `interval` until it yields a value or `timeout` passes.
///
/// The probe runs at least once. `Ok(None)` means the deadline passed; an
/// error from the probe ends the wait immediately.
pub async fn poll_until<T, E, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_returns_first_value() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<Option<u32>, ()> = poll_until(
            Duration::from_secs(1),
            Duration::from_millis(1),
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Ok((n == 2).then_some(n))
            },
        )
        .await;
        assert_eq!(result, Ok(Some(2)));
    }

    #[tokio::test]
    async fn test_times_out() {
        let start = Instant::now();
        let result: Result<Option<()>, ()> =
            poll_until(Duration::from_millis(30), Duration::from_millis(5), || async { Ok(None) }).await;
        assert_eq!(result, Ok(None));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_error_stops_wait() {
        let result: Result<Option<()>, &str> =
            poll_until(Duration::from_secs(5), Duration::from_millis(1), || async { Err("gone") }).await;
        assert_eq!(result, Err("gone"));
    }
}
