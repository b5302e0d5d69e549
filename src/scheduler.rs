/// Refresh scheduling: the periodic reload cycle and the one-shot retry
/// after a failed load.
///
/// # Clock injection
/// Every method takes `now: DateTime<Utc>` instead of reading the system
/// clock, so scheduling decisions are purely deterministic in tests. The
/// engine's tick loop calls `poll(now)` and executes whatever came due.
///
/// There is exactly one periodic cycle and at most one armed retry at any
/// time; restarting the cycle (on a model switch) disarms the retry, so
/// duplicate polling cannot leak across a model change.

use chrono::{DateTime, Duration, Utc};

/// Work the scheduler has decided is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueWork {
    /// Regular periodic reload (also the initial load).
    PeriodicReload,
    /// The one-shot follow-up after a failed load. The caller reloads only
    /// if the grid is still empty — a later success cancels the concern.
    RetryReload,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    poll_interval: Duration,
    retry_delay: Duration,
    next_poll_at: DateTime<Utc>,
    retry_at: Option<DateTime<Utc>>,
}

impl RefreshScheduler {
    /// A fresh scheduler is immediately due for its initial load.
    pub fn new(poll_interval_secs: u64, retry_delay_secs: u64, now: DateTime<Utc>) -> RefreshScheduler {
        RefreshScheduler {
            poll_interval: Duration::seconds(poll_interval_secs as i64),
            retry_delay: Duration::seconds(retry_delay_secs as i64),
            next_poll_at: now,
            retry_at: None,
        }
    }

    /// Returns the next piece of due work, if any, consuming it.
    ///
    /// An armed retry takes precedence over the periodic cycle; firing it
    /// disarms it (one scheduled follow-up per failed attempt — chains only
    /// if the retried load fails again and re-arms).
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<DueWork> {
        if let Some(at) = self.retry_at {
            if at <= now {
                self.retry_at = None;
                return Some(DueWork::RetryReload);
            }
        }
        if self.next_poll_at <= now {
            self.next_poll_at = now + self.poll_interval;
            return Some(DueWork::PeriodicReload);
        }
        None
    }

    /// A load failed: arm exactly one delayed retry.
    pub fn note_failure(&mut self, now: DateTime<Utc>) {
        self.retry_at = Some(now + self.retry_delay);
    }

    /// A load succeeded: any armed retry is moot.
    pub fn note_success(&mut self) {
        self.retry_at = None;
    }

    /// Model switch: force an immediate reload and restart the periodic
    /// cycle against the new model.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.next_poll_at = now;
        self.retry_at = None;
    }

    #[cfg(test)]
    fn retry_armed(&self) -> bool {
        self.retry_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
