//! Aggregate counters of successfully dispatched hits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

#[derive(Debug, Default)]
struct Counters {
    page_view: AtomicU64,
    screen_view: AtomicU64,
    app_view: AtomicU64,
    event: AtomicU64,
    item: AtomicU64,
    transaction: AtomicU64,
    social: AtomicU64,
    timing: AtomicU64,
    exception: AtomicU64,
}

/// Per-hit-type counters. Increments are atomic, and `reset` swaps in a
/// whole fresh counter set so concurrent readers never observe a torn,
/// partially-reset state.
#[derive(Debug)]
pub(crate) struct HitStats {
    counters: ArcSwap<Counters>,
}

impl HitStats {
    pub(crate) fn new() -> Self {
        Self {
            counters: ArcSwap::from_pointee(Counters::default()),
        }
    }

    /// Hit-type matching is case-insensitive; historical trackers emitted
    /// mixed casings like `pageView`.
    pub(crate) fn record(&self, hit_type: &str) {
        let counters = self.counters.load();
        let counter = if hit_type.eq_ignore_ascii_case("pageview") {
            &counters.page_view
        } else if hit_type.eq_ignore_ascii_case("screenview") {
            &counters.screen_view
        } else if hit_type.eq_ignore_ascii_case("appview") {
            &counters.app_view
        } else if hit_type.eq_ignore_ascii_case("event") {
            &counters.event
        } else if hit_type.eq_ignore_ascii_case("item") {
            &counters.item
        } else if hit_type.eq_ignore_ascii_case("transaction") {
            &counters.transaction
        } else if hit_type.eq_ignore_ascii_case("social") {
            &counters.social
        } else if hit_type.eq_ignore_ascii_case("timing") {
            &counters.timing
        } else if hit_type.eq_ignore_ascii_case("exception") {
            &counters.exception
        } else {
            return;
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.counters.store(Arc::new(Counters::default()));
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        let counters = self.counters.load();
        StatsSnapshot {
            page_view_hits: counters.page_view.load(Ordering::Relaxed),
            screen_view_hits: counters.screen_view.load(Ordering::Relaxed),
            app_view_hits: counters.app_view.load(Ordering::Relaxed),
            event_hits: counters.event.load(Ordering::Relaxed),
            item_hits: counters.item.load(Ordering::Relaxed),
            transaction_hits: counters.transaction.load(Ordering::Relaxed),
            social_hits: counters.social.load(Ordering::Relaxed),
            timing_hits: counters.timing.load(Ordering::Relaxed),
            exception_hits: counters.exception.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the dispatch counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    page_view_hits: u64,
    screen_view_hits: u64,
    app_view_hits: u64,
    event_hits: u64,
    item_hits: u64,
    transaction_hits: u64,
    social_hits: u64,
    timing_hits: u64,
    exception_hits: u64,
}

impl StatsSnapshot {
    pub fn page_view_hits(&self) -> u64 {
        self.page_view_hits
    }

    pub fn screen_view_hits(&self) -> u64 {
        self.screen_view_hits
    }

    pub fn app_view_hits(&self) -> u64 {
        self.app_view_hits
    }

    pub fn event_hits(&self) -> u64 {
        self.event_hits
    }

    pub fn item_hits(&self) -> u64 {
        self.item_hits
    }

    pub fn transaction_hits(&self) -> u64 {
        self.transaction_hits
    }

    pub fn social_hits(&self) -> u64 {
        self.social_hits
    }

    pub fn timing_hits(&self) -> u64 {
        self.timing_hits
    }

    pub fn exception_hits(&self) -> u64 {
        self.exception_hits
    }

    pub fn total_hits(&self) -> u64 {
        self.page_view_hits
            + self.screen_view_hits
            + self.app_view_hits
            + self.event_hits
            + self.item_hits
            + self.transaction_hits
            + self.social_hits
            + self.timing_hits
            + self.exception_hits
    }
}
