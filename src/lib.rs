//! threadcast - real-time thread update feeds for imageboard servers.
//!
//! One actor per watched thread keeps an in-memory copy of the thread,
//! applies mutations in submission order and fans coalesced frames out to
//! every subscribed client.
//!
//! ```text
//! request handlers ──> ClientRegistry ──> FeedRegistry ──> FeedActor (per thread)
//!                                                            │  ThreadCache
//!                                                            │  MessageBuffer + ticker
//!                                                            └──> Client::send
//! ```
//!
//! # Module Structure
//!
//! - `registry` - Feed and client directories (the public entry points)
//! - `actor` - Per-thread feed actor
//! - `cache` - Thread mirror and snapshot encoders
//! - `protocol` - Message tags, coalescing buffer, pausable ticker
//! - `model` - Post and thread projections
//! - `client` / `store` - Collaborator seams
//! - `config` - `threadcast.toml` loading
//! - `logger` - Colored module-prefixed logging

pub mod logger;

mod actor;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod registry;
pub mod store;

#[cfg(test)]
mod test_support;

pub use cache::ThreadCache;
pub use client::{Capabilities, Client, ClientHandle};
pub use config::Config;
pub use error::{FeedError, StoreError};
pub use registry::{ClientRegistry, FeedRegistry, SyncId};
pub use store::{MemoryStore, ThreadStore};
