//! Paced FIFO dispatch queue with a single worker.

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::error;

type Handler<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

struct QueueState<T> {
    items: VecDeque<T>,
    /// True while a worker task owns the queue.
    busy: bool,
    last_completed: Option<Instant>,
}

struct Shared<T> {
    state: Mutex<QueueState<T>>,
    handler: Handler<T>,
    pacing: Duration,
    idle: Notify,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs jobs one at a time in push order.
///
/// A job starts no sooner than `pacing` after the previous one completed,
/// however many jobs are pushed in between. There is no dedup, priority or
/// cancellation at this layer.
pub struct DispatchQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for DispatchQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> DispatchQueue<T> {
    /// Create a queue that runs `handler` for each job.
    pub fn new<F, Fut>(pacing: Duration, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: Handler<T> = Arc::new(move |job| handler(job).boxed());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    items: VecDeque::new(),
                    busy: false,
                    last_completed: None,
                }),
                handler,
                pacing,
                idle: Notify::new(),
            }),
        }
    }

    /// Append a job. Never blocks.
    ///
    /// Starts a worker if none is running, so it must be called from within a
    /// Tokio runtime.
    pub fn push(&self, job: T) {
        let start_worker = {
            let mut state = self.shared.lock();
            state.items.push_back(job);
            !std::mem::replace(&mut state.busy, true)
        };

        if start_worker {
            tokio::spawn(drain(Arc::clone(&self.shared)));
        }
    }

    /// Jobs waiting to start (excludes the one in flight).
    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when nothing is queued and no job is running.
    pub fn is_idle(&self) -> bool {
        let state = self.shared.lock();
        !state.busy && state.items.is_empty()
    }

    /// Wait until the queue is empty and the worker has finished.
    pub async fn drained(&self) {
        loop {
            let mut notified = pin!(self.shared.idle.notified());
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

/// Worker loop. Exactly one runs while `busy` is set.
async fn drain<T: Send + 'static>(shared: Arc<Shared<T>>) {
    loop {
        let last_completed = {
            let mut state = shared.lock();
            if state.items.is_empty() {
                state.busy = false;
                break;
            }
            state.last_completed
        };

        if let Some(done) = last_completed {
            tokio::time::sleep_until(done + shared.pacing).await;
        }

        // Only the worker pops, so the queue is still non-empty here
        let Some(job) = shared.lock().items.pop_front() else {
            continue;
        };

        let outcome = AssertUnwindSafe((shared.handler)(job))
            .catch_unwind()
            .await;
        if outcome.is_err() {
            error!("dispatch job panicked");
        }

        shared.lock().last_completed = Some(Instant::now());
    }

    shared.idle.notify_waiters();
}
