use std::{
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use log::warn;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use super::{
    poller::Poller,
    state::{FeedEvent, FeedState, Merge},
};

/// A [`Poller`] publishing its results as [`FeedState`] on a watch channel.
///
/// Readers always see a complete state; each tick swaps in a new one.
pub struct Feed<T> {
    poller: Poller,
    state: Arc<watch::Sender<FeedState<T>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Feed<T>
where
    T: Merge + Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<Arc<str>>, interval: Duration, parent: &CancellationToken) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            poller: Poller::new(name, interval, parent),
            state: Arc::new(state),
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        self.poller.name()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<T>> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> FeedState<T> {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_running()
    }

    /// Polls `fetch`, replacing the data with every result.
    pub fn start<F, Fut>(&self, fetch: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.spawn(fetch, FeedEvent::Set)
    }

    /// Polls `fetch`, merging every result into the data.
    pub fn start_merging<F, Fut>(&self, fetch: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.spawn(fetch, FeedEvent::Update)
    }

    fn spawn<F, Fut>(&self, mut fetch: F, into_event: fn(T) -> FeedEvent<T>) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let state = self.state.clone();

        let handle = self.poller.start(move || {
            let state = state.clone();
            if !state.borrow().is_ready() {
                state.send_modify(|current| *current = current.reduce(FeedEvent::Loading));
            }

            let fetched = fetch();
            async move {
                match fetched.await {
                    Ok(data) => {
                        state.send_modify(|current| *current = current.reduce(into_event(data)));
                        Ok(())
                    },
                    Err(e) => {
                        let message = format!("{:#}", e);
                        state.send_modify(|current| {
                            *current = current.reduce(FeedEvent::Failed(message))
                        });
                        Err(e)
                    },
                }
            }
        });

        match handle {
            Some(handle) => {
                if let Ok(mut slot) = self.handle.lock() {
                    *slot = Some(handle);
                }
                true
            },
            None => false,
        }
    }

    /// Stops polling and waits for the loop to exit.
    pub async fn shutdown(&self) {
        self.poller.stop();
        let handle = self.handle.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("[{}] Poll loop ended abnormally: {}", self.name(), e);
            }
        }
    }
}
