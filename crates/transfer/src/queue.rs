//! Bounded work queue shared by every transfer operation.
//!
//! Submissions go through an unbounded channel to a dispatcher task that
//! acquires a semaphore permit before spawning each job, so jobs start in
//! submission order and at most `concurrency` run at once. Submitting never
//! waits; [`TransferQueue::on_idle`] is the only suspending operation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};

use tokio::sync::{Notify, Semaphore, mpsc, oneshot};

/// Concurrency ceiling used by every upload, download and watch queue.
pub const DEFAULT_CONCURRENCY: usize = 10;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, Default)]
struct Counters {
    waiting: AtomicUsize,
    running: AtomicUsize,
    outstanding: AtomicUsize,
    idle: Notify,
}

impl Counters {
    fn finish(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Marks a job finished even if it panics.
struct Finished(Arc<Counters>);

impl Drop for Finished {
    fn drop(&mut self) {
        self.0.running.fetch_sub(1, Ordering::SeqCst);
        self.0.finish();
    }
}

/// Semaphore-gated queue with a fixed concurrency ceiling.
///
/// Clones share the same queue. Must be created inside a tokio runtime.
#[derive(Clone, Debug)]
pub struct TransferQueue {
    sender: mpsc::UnboundedSender<Job>,
    counters: Arc<Counters>,
    closed: Arc<AtomicBool>,
    concurrency: usize,
}

impl Default for TransferQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferQueue {
    /// Creates a queue running at most [`DEFAULT_CONCURRENCY`] jobs at once.
    pub fn new() -> Self {
        Self::with_concurrency(DEFAULT_CONCURRENCY)
    }

    /// Creates a queue running at most `concurrency` jobs at once (minimum 1).
    pub fn with_concurrency(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        let (sender, receiver) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        tokio::spawn(dispatch(
            receiver,
            Arc::new(Semaphore::new(concurrency)),
            Arc::clone(&counters),
        ));
        Self {
            sender,
            counters,
            closed: Arc::new(AtomicBool::new(false)),
            concurrency,
        }
    }

    /// Queues `job` and returns a handle to its output.
    ///
    /// After [`close`](Self::close) the job is dropped unstarted and the
    /// handle resolves to `None`.
    pub fn submit<F>(&self, job: F) -> Completion<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        if self.is_closed() {
            return Completion { receiver };
        }
        self.counters.outstanding.fetch_add(1, Ordering::SeqCst);
        self.counters.waiting.fetch_add(1, Ordering::SeqCst);
        let wrapped: Job = Box::pin(async move {
            let output = job.await;
            let _ = sender.send(output);
        });
        if self.sender.send(wrapped).is_err() {
            self.counters.waiting.fetch_sub(1, Ordering::SeqCst);
            self.counters.finish();
        }
        Completion { receiver }
    }

    /// Waits until nothing is waiting or running.
    pub async fn on_idle(&self) {
        loop {
            let notified = self.counters.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.counters.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Refuses further submissions. Queued jobs still run.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Jobs submitted but not yet started.
    pub fn waiting(&self) -> usize {
        self.counters.waiting.load(Ordering::SeqCst)
    }

    /// Jobs currently running.
    pub fn running(&self) -> usize {
        self.counters.running.load(Ordering::SeqCst)
    }

    /// Jobs waiting or running.
    pub fn pending(&self) -> usize {
        self.counters.outstanding.load(Ordering::SeqCst)
    }

    /// Returns `true` when no job is waiting or running.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Concurrency ceiling.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

async fn dispatch(
    mut receiver: mpsc::UnboundedReceiver<Job>,
    semaphore: Arc<Semaphore>,
    counters: Arc<Counters>,
) {
    while let Some(job) = receiver.recv().await {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        counters.waiting.fetch_sub(1, Ordering::SeqCst);
        counters.running.fetch_add(1, Ordering::SeqCst);
        let finished = Finished(Arc::clone(&counters));
        tokio::spawn(async move {
            let _permit = permit;
            let _finished = finished;
            job.await;
        });
    }
}

/// Output of a queued job.
///
/// Resolves to `None` when the job was refused, panicked or was dropped.
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> Future for Completion<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(Result::ok)
    }
}
