// SPDX-License-Identifier: GPL-3.0-only
//! Display hotplug detection
//!
//! A hidden window receives `WM_DISPLAYCHANGE` and posts
//! [`crate::app::AppEvent::DisplaysChanged`] to the owning thread. Plugging a
//! monitor in produces a burst of such broadcasts, and DDC/CI needs a moment
//! before it answers, so the owning thread runs every notification through a
//! [`HotplugDebouncer`] before refreshing the directory.

#[cfg(windows)]
mod watcher;

use std::time::Duration;

use tokio::time::Instant;

#[cfg(windows)]
pub use watcher::DisplayWatcher;

/// Minimum time between two refreshes
pub const RATE_LIMIT: Duration = Duration::from_millis(1500);
/// Time given to the hardware after the last change before re-enumerating
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Coalesces display-change bursts into single refreshes
#[derive(Debug)]
pub struct HotplugDebouncer {
    rate_limit: Duration,
    settle: Duration,
    last_refresh: Option<Instant>,
    deadline: Option<Instant>,
    coalesced: usize,
}

impl Default for HotplugDebouncer {
    fn default() -> Self {
        Self::new(RATE_LIMIT, SETTLE_DELAY)
    }
}

impl HotplugDebouncer {
    pub fn new(rate_limit: Duration, settle: Duration) -> Self {
        Self {
            rate_limit,
            settle,
            last_refresh: None,
            deadline: None,
            coalesced: 0,
        }
    }

    /// Record a display-change notification
    ///
    /// Returns `true` when this notification scheduled a new refresh and
    /// `false` when it was folded into one that is already pending.
    pub fn notify(&mut self, now: Instant) -> bool {
        if self.deadline.is_some() {
            self.coalesced += 1;
            return false;
        }

        let mut start = now;
        if let Some(last) = self.last_refresh {
            let earliest = last + self.rate_limit;
            if earliest > now {
                info!("Rate limiting: waiting additional {:?} before re-enumeration", earliest - now);
                start = earliest;
            }
        }
        self.deadline = Some(start + self.settle);
        true
    }

    /// When the pending refresh is due
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the pending refresh is due at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }

    /// Mark the pending refresh as done
    pub fn complete(&mut self, now: Instant) {
        if self.coalesced > 0 {
            info!("Drained {} additional hotplug events", self.coalesced);
        }
        self.deadline = None;
        self.coalesced = 0;
        self.last_refresh = Some(now);
    }
}
