//! The batching buffer.
//!
//! Accumulates serialized hits and flushes them to the batch endpoint when
//! the configured threshold is crossed or on an explicit flush. The
//! threshold check runs twice, optimistically outside the lock and then
//! authoritatively inside, so racing producers trigger exactly one
//! transmission per threshold crossing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::AnalyticsResult;
use crate::serialize::{elapsed_ms, PostPayload};
use crate::transport::{HttpBatchRequest, HttpTransport};

/// A serialized hit waiting in the buffer. Keeps the originating hit's
/// timestamp and explicit queue time so `qt` can be recomputed at the moment
/// the entry actually leaves the process.
#[derive(Clone, Debug)]
pub(crate) struct BatchEntry {
    body: Vec<(String, String)>,
    occurred_at: DateTime<Utc>,
    base_queue_time: Option<i64>,
}

impl From<PostPayload> for BatchEntry {
    fn from(payload: PostPayload) -> Self {
        Self {
            body: payload.body,
            occurred_at: payload.occurred_at,
            base_queue_time: payload.base_queue_time,
        }
    }
}

pub(crate) struct BatchBuffer {
    url: String,
    batch_size: usize,
    auto_queue_time: bool,
    pending: Mutex<Vec<BatchEntry>>,
    // Mirror of pending.len() for the outside-the-lock check.
    pending_len: AtomicUsize,
}

impl BatchBuffer {
    pub(crate) fn new(url: impl Into<String>, batch_size: usize, auto_queue_time: bool) -> Self {
        Self {
            url: url.into(),
            batch_size: batch_size.max(1),
            auto_queue_time,
            pending: Mutex::new(Vec::new()),
            pending_len: AtomicUsize::new(0),
        }
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending_len.load(Ordering::Acquire)
    }

    /// Appends an entry and flushes if the threshold was crossed.
    pub(crate) fn enqueue(
        &self,
        entry: BatchEntry,
        transport: &dyn HttpTransport,
    ) -> AnalyticsResult<()> {
        {
            let mut pending = self.pending.lock().unwrap();
            pending.push(entry);
            self.pending_len.store(pending.len(), Ordering::Release);
        }
        self.flush_if(false, transport)
    }

    /// Transmits whatever is pending, regardless of the threshold.
    pub(crate) fn flush(&self, transport: &dyn HttpTransport) -> AnalyticsResult<()> {
        self.flush_if(true, transport)
    }

    fn flush_if(&self, force: bool, transport: &dyn HttpTransport) -> AnalyticsResult<()> {
        if !force && self.pending_count() < self.batch_size {
            return Ok(());
        }

        // Re-check under the lock: another producer may have drained the
        // buffer between our optimistic check and here. Transmission also
        // happens under the lock, which serializes batch flushes with
        // concurrent enqueues; earlier full batches always leave before
        // later ones are formed.
        let mut pending = self.pending.lock().unwrap();
        loop {
            let ready = if force {
                pending.len()
            } else if pending.len() >= self.batch_size {
                self.batch_size
            } else {
                0
            };
            if ready == 0 {
                return Ok(());
            }

            let drained: Vec<BatchEntry> = pending.drain(..ready).collect();
            self.pending_len.store(pending.len(), Ordering::Release);

            let now = Utc::now();
            let bodies = drained
                .into_iter()
                .map(|entry| self.finalize(entry, now))
                .collect();

            if let Err(err) = transport.post_batch(&HttpBatchRequest {
                url: self.url.clone(),
                bodies,
            }) {
                // At-most-once: the batch is lost, and anything still
                // pending goes with it rather than growing without bound.
                let lost = ready + pending.len();
                pending.clear();
                self.pending_len.store(0, Ordering::Release);
                log::warn!("batch transmission failed, dropping {lost} buffered hits: {err}");
                return Err(err);
            }

            if force {
                return Ok(());
            }
        }
    }

    /// Recomputes `qt` for an entry at transmission time: the elapsed time
    /// is measured from the hit's own timestamp, not from enqueue.
    fn finalize(&self, entry: BatchEntry, now: DateTime<Utc>) -> Vec<(String, String)> {
        let mut body = entry.body;
        if self.auto_queue_time {
            let queue_time =
                entry.base_queue_time.unwrap_or(0) + elapsed_ms(entry.occurred_at, now);
            match body.iter_mut().find(|(key, _)| key == "qt") {
                Some((_, value)) => *value = queue_time.to_string(),
                None => body.push(("qt".to_string(), queue_time.to_string())),
            }
        }
        body
    }
}
