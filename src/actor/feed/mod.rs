//! Feed Actor - One Watched Thread
//!
//! Lifecycle:
//!
//! ```text
//! Init ──fetch ok──> Running ──last client removed──> Terminated
//!   │
//!   └──fetch failed──> reject queued AddClients ──> Terminated
//! ```
//!
//! While running, the loop handles exactly one inbox message at a time, so
//! mutations of one thread are totally ordered. Outgoing messages are
//! coalesced in a [`MessageBuffer`] and flushed on every tick of a
//! [`PausableTicker`], which is paused whenever a tick finds nothing to send.

mod handlers;


use std::sync::Arc;

use tokio::sync::{OnceCell, mpsc, oneshot};

use super::messages::{FeedMsg, Removal};
use crate::cache::ThreadCache;
use crate::client::ClientHandle;
use crate::config::FeedConfig;
use crate::error::{FeedError, StoreError};
use crate::protocol::{MessageBuffer, PausableTicker};
use crate::store::ThreadStore;

// ============================================================================
// Handle
// ============================================================================

/// Sending side of a running or starting feed.
#[derive(Debug, Clone)]
pub(crate) struct FeedHandle {
    pub(crate) thread: u64,
    /// Distinguishes successive feeds of the same thread
    pub(crate) generation: u64,
    tx: mpsc::Sender<FeedMsg>,
    /// Set before the inbox closes when the thread read failed
    init_error: Arc<OnceCell<StoreError>>,
}

impl FeedHandle {
    /// Spawn a feed task. The thread read happens inside the task.
    pub(crate) fn spawn(
        thread: u64,
        generation: u64,
        store: Arc<dyn ThreadStore>,
        config: Arc<FeedConfig>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.inbox_capacity.max(1));
        let init_error = Arc::new(OnceCell::new());
        tokio::spawn(start(thread, rx, store, config, Arc::clone(&init_error)));
        Self {
            thread,
            generation,
            tx,
            init_error,
        }
    }

    /// Why the feed stopped taking messages: its startup failure, if any.
    fn closed_error(&self) -> FeedError {
        match self.init_error.get() {
            Some(source) => FeedError::Init {
                thread: self.thread,
                source: source.clone(),
            },
            None => FeedError::Closed(self.thread),
        }
    }

    /// Deliver a message, waiting until the feed has room for it.
    pub(crate) async fn send(&self, msg: FeedMsg) -> Result<(), FeedError> {
        self.tx.send(msg).await.map_err(|_| self.closed_error())
    }

    pub(crate) async fn add_client(&self, client: ClientHandle) -> Result<(), FeedError> {
        let (reply, rx) = oneshot::channel();
        self.send(FeedMsg::AddClient { client, reply }).await?;
        rx.await.map_err(|_| self.closed_error())?
    }

    pub(crate) async fn remove_client(&self, client: ClientHandle) -> Result<Removal, FeedError> {
        let (reply, rx) = oneshot::channel();
        self.send(FeedMsg::RemoveClient { client, reply }).await?;
        rx.await.map_err(|_| self.closed_error())
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// Startup
// ============================================================================

async fn start(
    thread: u64,
    mut rx: mpsc::Receiver<FeedMsg>,
    store: Arc<dyn ThreadStore>,
    config: Arc<FeedConfig>,
    init_error: Arc<OnceCell<StoreError>>,
) {
    let fetched = tokio::task::spawn_blocking(move || store.thread(thread))
        .await
        .unwrap_or_else(|err| Err(StoreError::Backend(err.to_string())));

    match fetched {
        Ok(data) => {
            let cache = ThreadCache::new(data, &config);
            crate::debug!("feed"; "thread {} started with {} posts", thread, cache.len());
            FeedActor::new(thread, rx, cache, config).run().await;
        }
        Err(err) => {
            crate::log!("feed"; "thread {} failed to start: {}", thread, err);
            // senders blocked on a full inbox read this once it closes
            let _ = init_error.set(err.clone());
            reject_pending(thread, &mut rx, err).await;
        }
    }
}

/// Answer everything queued behind a failed startup, then stop.
async fn reject_pending(thread: u64, rx: &mut mpsc::Receiver<FeedMsg>, err: StoreError) {
    rx.close();
    while let Some(msg) = rx.recv().await {
        match msg {
            FeedMsg::AddClient { reply, .. } => {
                let _ = reply.send(Err(FeedError::Init {
                    thread,
                    source: err.clone(),
                }));
            }
            FeedMsg::RemoveClient { reply, .. } => {
                let _ = reply.send(Removal::Empty);
            }
            _ => {}
        }
    }
}

// ============================================================================
// Actor
// ============================================================================

pub(crate) struct FeedActor {
    thread: u64,
    rx: mpsc::Receiver<FeedMsg>,
    cache: ThreadCache,
    clients: Vec<ClientHandle>,
    buffer: MessageBuffer,
    ticker: PausableTicker,
    /// Unique IP count last put on the wire
    last_ip_count: Option<usize>,
}

impl FeedActor {
    fn new(
        thread: u64,
        rx: mpsc::Receiver<FeedMsg>,
        cache: ThreadCache,
        config: Arc<FeedConfig>,
    ) -> Self {
        Self {
            thread,
            rx,
            cache,
            clients: Vec::new(),
            buffer: MessageBuffer::new(),
            ticker: PausableTicker::new(config.tick_interval()),
            last_ip_count: None,
        }
    }

    /// Run the actor event loop
    async fn run(mut self) {
        loop {
            tokio::select! {
                msg = self.rx.recv() => {
                    let Some(msg) = msg else {
                        crate::debug!("feed"; "thread {} inbox closed", self.thread);
                        break;
                    };
                    if self.handle(msg).is_break() {
                        break;
                    }
                }
                _ = self.ticker.tick() => self.flush(),
            }
        }
        crate::debug!("feed"; "thread {} terminated", self.thread);
    }
}
