//! `[feed]` section configuration.
//!
//! Contains per-thread feed settings.
//!
//! # Example
//!
//! ```toml
//! [feed]
//! tick_interval_ms = 100      # Coalescing period for buffered messages
//! bump_limit = 1000           # Post count past which replies stop bumping
//! recent_window_secs = 900    # "recent" window of the legacy sync summary
//! snapshot_replies = 99       # Replies kept when a client asks for last-N only
//! inbox_capacity = 1          # Commands queued per feed before senders wait
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-thread feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Period of the flush ticker, in milliseconds.
    pub tick_interval_ms: u64,

    /// Post counter ceiling. A reply only bumps the thread while the
    /// counter is below this value.
    pub bump_limit: u32,

    /// Posts newer than this are listed under `recent` in the legacy summary.
    pub recent_window_secs: u64,

    /// Number of replies kept (besides the opening post) in last-N snapshots.
    pub snapshot_replies: usize,

    /// Bounded inbox size of each feed.
    /// - `1` (default): senders wait for the loop almost as in a rendezvous
    pub inbox_capacity: usize,
}

impl FeedConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn recent_window(&self) -> Duration {
        Duration::from_secs(self.recent_window_secs)
    }

    /// Raise values a feed cannot run with to their smallest usable value.
    ///
    /// Returns the names of the fields that were changed.
    pub fn normalize(&mut self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = 1;
            changed.push("tick_interval_ms");
        }
        if self.inbox_capacity == 0 {
            self.inbox_capacity = 1;
            changed.push("inbox_capacity");
        }
        if self.snapshot_replies == 0 {
            self.snapshot_replies = 1;
            changed.push("snapshot_replies");
        }
        changed
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            bump_limit: 1000,
            recent_window_secs: 15 * 60,
            snapshot_replies: 99,
            inbox_capacity: 1,
        }
    }
}
