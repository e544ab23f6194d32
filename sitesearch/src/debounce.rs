//! Debounce Scheduler
//!
//! Coalesces a burst of triggers into one delayed action run with the last
//! trigger's argument. The scheduler owns at most one pending timer: a new
//! trigger aborts it and starts a fresh one. Once the timer has fired the
//! action runs to completion; later triggers never interrupt it.

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Quiet period before a search fires
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runtime used when triggers arrive outside any tokio context (e.g. a native UI thread).
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// Current runtime if there is one, otherwise the shared fallback
pub(crate) fn runtime_handle() -> tokio::runtime::Handle {
    tokio::runtime::Handle::try_current().unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
}

type Action<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

struct Pending<T> {
    id: u64,
    arg: T,
    timer: JoinHandle<()>,
}

/// Delay gate in front of an async action
pub struct Debouncer<T> {
    delay: Duration,
    action: Action<T>,
    pending: Arc<Mutex<Option<Pending<T>>>>,
    next_id: AtomicU64,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action: Action<T> =
            Arc::new(move |arg: T| -> BoxFuture<'static, ()> { Box::pin(action(arg)) });
        Self {
            delay,
            action,
            pending: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule the action `delay` from now with `arg`, replacing any pending run.
    pub fn trigger(&self, arg: T) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // Deadline is fixed at trigger time, not when the timer task first polls
        let deadline = Instant::now() + self.delay;
        let slot = Arc::clone(&self.pending);
        let action = Arc::clone(&self.action);

        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.timer.abort();
        }
        let timer = runtime_handle().spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let fired = {
                let mut pending = slot.lock();
                match pending.as_ref() {
                    Some(p) if p.id == id => pending.take(),
                    _ => None,
                }
            };
            if let Some(p) = fired {
                action(p.arg).await;
            }
        });
        *pending = Some(Pending { id, arg, timer });
    }

    /// Drop the pending run, if any. Returns whether one was pending.
    pub fn cancel_pending(&self) -> bool {
        match self.pending.lock().take() {
            Some(p) => {
                p.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Run the pending action now instead of waiting out the delay.
    /// Returns whether anything was pending.
    pub async fn flush(&self) -> bool {
        let fired = self.pending.lock().take();
        match fired {
            Some(p) => {
                p.timer.abort();
                (self.action)(p.arg).await;
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(p) = self.pending.lock().take() {
            p.timer.abort();
        }
    }
}
