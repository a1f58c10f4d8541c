//! The async dispatch pool.
//!
//! A fixed set of named worker threads drains a bounded job queue. When the
//! queue is full the submitting thread runs the job itself: backpressure
//! that never drops a hit and never queues unbounded memory, at the cost of
//! occasionally blocking the caller.

use std::sync::Mutex;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::error::{internal_error, AnalyticsResult};
use crate::response::Response;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub(crate) struct WorkerPool {
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub(crate) fn new(
        threads: usize,
        queue_size: usize,
        name_prefix: &str,
    ) -> AnalyticsResult<Self> {
        let threads = threads.max(1);
        let (sender, receiver) = bounded::<Job>(queue_size.max(1));

        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let receiver: Receiver<Job> = receiver.clone();
            let worker = std::thread::Builder::new()
                .name(format!("{name_prefix}-{index}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                })
                .map_err(|err| {
                    internal_error(format!("failed to spawn analytics worker thread: {err}"))
                })?;
            workers.push(worker);
        }

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        })
    }

    /// Queues a job, or runs it on the calling thread when the queue is full
    /// or the pool is already shut down.
    pub(crate) fn execute(&self, job: Job) {
        let rejected = {
            let guard = self.sender.lock().unwrap();
            match guard.as_ref() {
                Some(sender) => match sender.try_send(job) {
                    Ok(()) => None,
                    Err(TrySendError::Full(job)) | Err(TrySendError::Disconnected(job)) => {
                        Some(job)
                    }
                },
                None => Some(job),
            }
        };

        // Caller-runs fallback, outside the sender lock.
        if let Some(job) = rejected {
            job();
        }
    }

    /// Stops accepting jobs, lets queued jobs finish and joins the workers.
    /// Idempotent.
    pub(crate) fn shutdown(&self) {
        drop(self.sender.lock().unwrap().take());
        let workers = std::mem::take(&mut *self.workers.lock().unwrap());
        let current = std::thread::current().id();
        for worker in workers {
            // A worker releasing the last pool handle reaches here on its
            // own thread; joining itself would block forever.
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                log::warn!("analytics worker thread panicked during shutdown");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The pending outcome of a `send_async` call.
///
/// `wait` blocks until the dispatch finishes; a future for a disabled client
/// is created already completed and never touches the pool.
pub struct ResponseFuture {
    receiver: Receiver<AnalyticsResult<Response>>,
}

impl ResponseFuture {
    pub(crate) fn channel() -> (Sender<AnalyticsResult<Response>>, Self) {
        let (sender, receiver) = bounded(1);
        (sender, Self { receiver })
    }

    pub(crate) fn completed(result: AnalyticsResult<Response>) -> Self {
        let (sender, future) = Self::channel();
        // Capacity one, nothing else holds the sender: cannot fail.
        let _ = sender.send(result);
        future
    }

    /// Blocks until the dispatch completes.
    pub fn wait(self) -> AnalyticsResult<Response> {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(internal_error("analytics worker dropped the response")))
    }

    /// Returns the outcome if the dispatch already completed.
    pub fn try_wait(&self) -> Option<AnalyticsResult<Response>> {
        self.receiver.try_recv().ok()
    }
}
