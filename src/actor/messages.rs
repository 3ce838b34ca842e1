//! Feed Message Definitions
//!
//! ```text
//! FeedRegistry --AddClient/RemoveClient--> FeedActor --reply--> FeedRegistry
//! FeedRegistry --Broadcast/InsertPost/...--> FeedActor
//! ```

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::client::ClientHandle;
use crate::error::FeedError;
use crate::model::{Image, MutationKind, Post};

/// Outcome of removing a client from a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
    /// Clients still subscribed
    Remaining(usize),
    /// Last client left, the feed loop has exited
    Empty,
}

/// Messages to a FeedActor
#[derive(Debug)]
pub(crate) enum FeedMsg {
    /// Subscribe a client and send it the current thread state
    AddClient {
        client: ClientHandle,
        reply: oneshot::Sender<Result<(), FeedError>>,
    },
    RemoveClient {
        client: ClientHandle,
        reply: oneshot::Sender<Removal>,
    },
    /// Pre-encoded message for every subscriber
    Broadcast(Bytes),
    /// New reply. `None` payload reattaches a reclaimed open post silently.
    InsertPost { post: Post, payload: Option<Bytes> },
    SetOpenBody {
        id: u64,
        body: String,
        payload: Bytes,
    },
    InsertImage {
        id: u64,
        image: Image,
        payload: Bytes,
    },
    PostMutation {
        id: u64,
        kind: MutationKind,
        payload: Bytes,
    },
}
