//! Error types surfaced by the feed engine.

use std::net::IpAddr;

use thiserror::Error;

/// Failure of the persistence collaborator to produce a thread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("thread {0} does not exist")]
    NotFound(u64),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors reported to callers that can still react to them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The initial thread read of a new feed failed. Nothing was registered.
    #[error("failed to start feed for thread {thread}")]
    Init {
        thread: u64,
        #[source]
        source: StoreError,
    },

    /// The feed stopped before accepting the command, and a fresh feed
    /// stopped as well.
    #[error("feed for thread {0} is closed")]
    Closed(u64),

    #[error("too many connections from {0}")]
    TooManyConnections(IpAddr),
}
