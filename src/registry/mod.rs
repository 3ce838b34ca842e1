//! Process-wide directories.
//!
//! ```text
//! ClientRegistry ── client -> (thread, board) ──> FeedRegistry ── thread -> FeedHandle
//!       │                                              │
//!       └── ip -> connection count                     └── spawns feeds lazily
//! ```
//!
//! Both maps sit behind reader/writer locks that are never held across an
//! `.await`. Talking to a feed always happens after the lock is released.

mod clients;
mod feeds;


pub use clients::{ClientRegistry, SyncId};
pub use feeds::FeedRegistry;
