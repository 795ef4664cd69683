//! Deadline-based debouncing.
//!
//! A [`Debouncer`] accumulates items and pushes its deadline back by the
//! quiet period on every push. The owner polls [`sleep_until_due`] inside a
//! `select!` loop and drains the batch with [`Debouncer::take`] when the
//! deadline passes.

use std::time::Duration;

use tokio::time::Instant;

/// Quiet period of the activity log.
pub const ACTIVITY_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Quiet period of the theme preview notice.
pub const PREVIEW_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// Accumulates items until no new item arrives for the quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    deadline: Option<Instant>,
    pending: Vec<T>,
}

impl<T> Debouncer<T> {
    /// Creates an empty debouncer.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
            pending: Vec::new(),
        }
    }

    /// Adds `item` and restarts the quiet period from now.
    pub fn push(&mut self, item: T) {
        self.push_at(item, Instant::now());
    }

    /// Adds `item` and restarts the quiet period from `now`.
    pub fn push_at(&mut self, item: T, now: Instant) {
        self.pending.push(item);
        self.deadline = Some(now + self.quiet);
    }

    /// Keeps the batch and restarts the quiet period from `now`.
    pub fn postpone_at(&mut self, now: Instant) {
        if !self.pending.is_empty() {
            self.deadline = Some(now + self.quiet);
        }
    }

    /// When the batch becomes due, if anything is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` once the quiet period has elapsed at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }

    /// Drains the batch and clears the deadline.
    pub fn take(&mut self) -> Vec<T> {
        self.deadline = None;
        std::mem::take(&mut self.pending)
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }
}

/// Sleeps until `deadline`, or forever when there is none.
pub async fn sleep_until_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
