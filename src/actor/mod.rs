//! Per-thread feed actors.
//!
//! One task per watched thread, reachable only through its bounded inbox:
//!
//! ```text
//!                      FeedMsg (bounded, FIFO)
//! FeedRegistry ──────────────────────────────────> FeedActor ──frames──> Clients
//!      ^                                              │
//!      └────────── oneshot replies (AddClient/RemoveClient)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Inbox message types
//! - `feed` - Feed startup, command loop and the handle used to reach it

pub(crate) mod feed;
pub(crate) mod messages;

pub(crate) use feed::FeedHandle;
pub(crate) use messages::Removal;
