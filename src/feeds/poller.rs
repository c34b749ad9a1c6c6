//! Fixed-delay poll loop.
//!
//! The fetch runs immediately on [`Poller::start`], then the next run starts
//! `interval` after the previous one *completed*. Runs never overlap.
//! [`Poller::stop`] is terminal: a pending sleep never fires and an in-flight
//! fetch is dropped, so its result is never published.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::Result;
use log::{debug, error, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Clears the running flag when the loop task ends, panics included.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct Poller {
    name: Arc<str>,
    interval: Duration,
    running: Arc<AtomicBool>,
    cancellation_token: CancellationToken,
}

impl Poller {
    /// Creates a stopped poller. Cancelling `parent` stops it too.
    pub fn new(name: impl Into<Arc<str>>, interval: Duration, parent: &CancellationToken) -> Self {
        Self {
            name: name.into(),
            interval,
            running: Arc::new(AtomicBool::new(false)),
            cancellation_token: parent.child_token(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The loop task is alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Spawns the poll loop.
    ///
    /// Returns `None` without spawning when the poller is already running or
    /// was stopped. A failed tick is logged and the next one is scheduled as
    /// usual.
    pub fn start<F, Fut>(&self, mut tick: F) -> Option<JoinHandle<()>>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        if self.is_stopped() {
            warn!("[{}] Poller was stopped, not restarting", self.name);
            return None;
        }

        if self.running.swap(true, Ordering::SeqCst) {
            debug!("[{}] Poller already running", self.name);
            return None;
        }

        let name = self.name.clone();
        let interval = self.interval;
        let running = self.running.clone();
        let cancellation_token = self.cancellation_token.clone();

        Some(tokio::spawn(async move {
            let _running = RunningGuard(running);
            debug!("[{}] Polling every {:?}", name, interval);

            loop {
                // `tick()` has side effects before its future is polled
                if cancellation_token.is_cancelled() {
                    break;
                }
                let fetch = tick();

                tokio::select! {
                    biased;
                    _ = cancellation_token.cancelled() => break,
                    result = fetch => {
                        if let Err(e) = result {
                            error!("[{}] Poll failed: {:#}", name, e);
                        }
                    }
                }

                tokio::select! {
                    biased;
                    _ = cancellation_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }

            debug!("[{}] Poller stopped", name);
        }))
    }

    pub fn stop(&self) {
        self.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };
    use tokio::time::{sleep, Instant};

    fn explode() -> Result<()> {
        panic!("tick panicked")
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_run_waits_for_completion() {
        let starts: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
        let poller = Poller::new("sequential", Duration::from_millis(1000), &CancellationToken::new());

        let recorded = starts.clone();
        let handle = poller
            .start(move || {
                let recorded = recorded.clone();
                async move {
                    recorded.lock().unwrap().push(Instant::now());
                    sleep(Duration::from_millis(200)).await;
                    Ok(())
                }
            })
            .unwrap();

        sleep(Duration::from_millis(2500)).await;
        poller.stop();
        handle.await.unwrap();

        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 3);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(1200));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_runs() {
        let calls = counter();
        let poller = Poller::new("stop", Duration::from_millis(1000), &CancellationToken::new());

        let count = calls.clone();
        let handle = poller
            .start(move || {
                count.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .unwrap();

        sleep(Duration::from_millis(100)).await;
        assert!(poller.is_running());
        poller.stop();
        handle.await.unwrap();

        sleep(Duration::from_millis(5000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!poller.is_running());
        assert!(poller.start(|| async { Ok(()) }).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_noop() {
        let calls = counter();
        let poller = Poller::new("single", Duration::from_millis(1000), &CancellationToken::new());

        let tick = {
            let calls = calls.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            }
        };

        assert!(poller.start(tick.clone()).is_some());
        assert!(poller.start(tick).is_none());

        sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_result_is_discarded() {
        let published = Arc::new(AtomicBool::new(false));
        let poller = Poller::new("in-flight", Duration::from_millis(1000), &CancellationToken::new());

        let flag = published.clone();
        let handle = poller
            .start(move || {
                let flag = flag.clone();
                async move {
                    sleep(Duration::from_millis(500)).await;
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                }
            })
            .unwrap();

        sleep(Duration::from_millis(100)).await;
        poller.stop();
        handle.await.unwrap();

        sleep(Duration::from_millis(1000)).await;
        assert!(!published.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_keep_schedule() {
        let calls = counter();
        let parent = CancellationToken::new();
        let poller = Poller::new("failing", Duration::from_millis(1000), &parent);

        let count = calls.clone();
        let handle = poller
            .start(move || {
                count.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(anyhow!("upstream down")) }
            })
            .unwrap();

        sleep(Duration::from_millis(2500)).await;
        // cancelling the parent stops the child poller
        parent.cancel();
        handle.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(poller.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_first_tick() {
        let calls = counter();
        let poller = Poller::new("early-stop", Duration::from_millis(1000), &CancellationToken::new());

        let count = calls.clone();
        let handle = poller
            .start(move || {
                count.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .unwrap();

        // the loop task has not been polled yet
        poller.stop();
        handle.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_tick_clears_running() {
        let poller = Poller::new("panicking", Duration::from_millis(1000), &CancellationToken::new());

        let handle = poller
            .start(|| async { explode() })
            .unwrap();

        assert!(handle.await.unwrap_err().is_panic());
        assert!(!poller.is_running());
        assert!(!poller.is_stopped());
    }
}
