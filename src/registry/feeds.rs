//! Directory of live feeds, keyed by thread id.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::actor::messages::FeedMsg;
use crate::actor::{FeedHandle, Removal};
use crate::client::ClientHandle;
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::model::{Image, MutationKind, Post};
use crate::protocol::{MessageType, encode_message};
use crate::store::ThreadStore;

/// Maps thread ids to their feeds, starting and dropping feeds on demand.
///
/// Post-targeted methods are silent no-ops when the thread has no live feed:
/// posting and moderation legally target threads nobody watches.
pub struct FeedRegistry {
    feeds: RwLock<FxHashMap<u64, FeedHandle>>,
    store: Arc<dyn ThreadStore>,
    config: Arc<FeedConfig>,
    next_generation: AtomicU64,
}

impl FeedRegistry {
    /// Create an empty registry. Zero periods and capacities in `config` are
    /// raised to their smallest usable value.
    pub fn new(store: Arc<dyn ThreadStore>, mut config: FeedConfig) -> Self {
        let changed = config.normalize();
        if !changed.is_empty() {
            crate::log!("config"; "feed settings out of range, raised to minimum: {}", changed.join(", "));
        }
        Self {
            feeds: RwLock::new(FxHashMap::default()),
            store,
            config: Arc::new(config),
            next_generation: AtomicU64::new(0),
        }
    }

    // ========================================================================
    // lookup
    // ========================================================================

    fn get(&self, thread: u64) -> Option<FeedHandle> {
        self.feeds.read().get(&thread).cloned()
    }

    /// Existing feed, or a freshly spawned one.
    ///
    /// Only the check-and-insert runs under the write lock. The thread read
    /// happens in the new feed's own task.
    fn get_or_spawn(&self, thread: u64) -> FeedHandle {
        if let Some(handle) = self.get(thread).filter(|h| !h.is_closed()) {
            return handle;
        }

        let mut feeds = self.feeds.write();
        if let Some(handle) = feeds.get(&thread).filter(|h| !h.is_closed()) {
            return handle.clone();
        }
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let handle = FeedHandle::spawn(
            thread,
            generation,
            Arc::clone(&self.store),
            Arc::clone(&self.config),
        );
        feeds.insert(thread, handle.clone());
        crate::debug!("registry"; "starting feed for thread {}", thread);
        handle
    }

    /// Drop the entry only if it still belongs to `handle`'s feed.
    fn remove_if_current(&self, handle: &FeedHandle) {
        let mut feeds = self.feeds.write();
        if feeds
            .get(&handle.thread)
            .is_some_and(|h| h.generation == handle.generation)
        {
            feeds.remove(&handle.thread);
            crate::debug!("registry"; "dropped feed for thread {}, {} live", handle.thread, feeds.len());
        }
    }

    // ========================================================================
    // subscriptions
    // ========================================================================

    /// Subscribe a client to a thread, starting its feed if needed.
    ///
    /// If the feed cannot read the thread, the error is returned and nothing
    /// stays registered. A feed that exits between lookup and delivery is
    /// replaced once; if the replacement closes too, `Closed` is returned.
    pub async fn add_client(&self, thread: u64, client: ClientHandle) -> Result<(), FeedError> {
        let mut respawned = false;
        loop {
            let handle = self.get_or_spawn(thread);
            match handle.add_client(client.clone()).await {
                Ok(()) => return Ok(()),
                Err(FeedError::Closed(_)) if !respawned => {
                    self.remove_if_current(&handle);
                    respawned = true;
                }
                Err(err) => {
                    self.remove_if_current(&handle);
                    return Err(err);
                }
            }
        }
    }

    /// Unsubscribe a client. The feed is dropped once it reports no clients.
    pub async fn remove_client(&self, thread: u64, client: ClientHandle) {
        let Some(handle) = self.get(thread) else {
            return;
        };
        match handle.remove_client(client).await {
            Ok(Removal::Remaining(count)) => {
                crate::debug!("registry"; "thread {} keeps {} clients", thread, count);
            }
            Ok(Removal::Empty) | Err(_) => self.remove_if_current(&handle),
        }
    }

    // ========================================================================
    // forwarders
    // ========================================================================

    async fn forward(&self, thread: u64, msg: FeedMsg) {
        let Some(handle) = self.get(thread) else {
            crate::debug!("registry"; "no feed for thread {}, dropping message", thread);
            return;
        };
        if handle.send(msg).await.is_err() {
            self.remove_if_current(&handle);
        }
    }

    /// Broadcast a pre-encoded message to every subscriber of a thread.
    pub async fn send_to(&self, thread: u64, payload: Bytes) {
        self.forward(thread, FeedMsg::Broadcast(payload)).await;
    }

    /// Insert a reply. A `None` payload reattaches a reclaimed open post
    /// without notifying anyone.
    pub async fn insert_post(&self, thread: u64, post: Post, payload: Option<Bytes>) {
        self.forward(thread, FeedMsg::InsertPost { post, payload }).await;
    }

    pub async fn set_open_body(&self, thread: u64, id: u64, body: String, payload: Bytes) {
        self.forward(thread, FeedMsg::SetOpenBody { id, body, payload }).await;
    }

    pub async fn insert_image(&self, thread: u64, id: u64, image: Image, payload: Bytes) {
        self.forward(thread, FeedMsg::InsertImage { id, image, payload }).await;
    }

    pub async fn post_mutation(&self, thread: u64, id: u64, kind: MutationKind, payload: Bytes) {
        self.forward(thread, FeedMsg::PostMutation { id, kind, payload }).await;
    }

    pub async fn close_post(&self, thread: u64, id: u64, payload: Bytes) {
        self.post_mutation(thread, id, MutationKind::Close, payload).await;
    }

    // ------------------------------------------------------------------------
    // moderation with the standard `<tag><id>` payload
    // ------------------------------------------------------------------------

    async fn moderate(&self, thread: u64, id: u64, kind: MutationKind, typ: MessageType) {
        match encode_message(typ, &id) {
            Ok(payload) => self.post_mutation(thread, id, kind, payload).await,
            Err(err) => crate::log!("error"; "failed to encode {:?} for post {}: {}", typ, id, err),
        }
    }

    pub async fn ban_post(&self, thread: u64, id: u64) {
        self.moderate(thread, id, MutationKind::Ban, MessageType::Banned).await;
    }

    pub async fn delete_post(&self, thread: u64, id: u64) {
        self.moderate(thread, id, MutationKind::Delete, MessageType::DeletePost).await;
    }

    pub async fn delete_image(&self, thread: u64, id: u64) {
        self.moderate(thread, id, MutationKind::DeleteImage, MessageType::DeleteImage).await;
    }

    pub async fn spoiler_image(&self, thread: u64, id: u64) {
        self.moderate(thread, id, MutationKind::SpoilerImage, MessageType::Spoiler).await;
    }

    pub async fn meido_vision(&self, thread: u64, id: u64) {
        self.moderate(thread, id, MutationKind::MeidoVision, MessageType::MeidoVision).await;
    }

    // ========================================================================
    // introspection
    // ========================================================================

    /// Number of registered feeds.
    pub fn len(&self) -> usize {
        self.feeds.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.read().is_empty()
    }

    pub fn contains(&self, thread: u64) -> bool {
        self.feeds.read().contains_key(&thread)
    }

    /// Forget every feed. Feeds exit once their inboxes drain.
    pub fn clear(&self) {
        let mut feeds = self.feeds.write();
        crate::debug!("registry"; "clearing {} feeds", feeds.len());
        feeds.clear();
    }
}
