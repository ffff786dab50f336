//! Waiting on asynchronous outcomes.

use std::future::Future;
use std::time::Duration;

/// Re-checks `condition` every few milliseconds until it holds or `timeout`
/// passes. Returns whether it held.
pub async fn eventually<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Like [`eventually`] for a synchronous condition
pub async fn eventually_sync<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    eventually(timeout, || std::future::ready(condition())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn returns_once_condition_holds() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&polls);
        let held = eventually_sync(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst) >= 2
        })
        .await;

        assert!(held);
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_timeout() {
        assert!(!eventually_sync(Duration::from_millis(20), || false).await);
    }
}
