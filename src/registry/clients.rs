//! Directory of connected clients and their sync targets.

use std::net::IpAddr;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::FeedRegistry;
use crate::client::ClientHandle;
use crate::config::ClientsConfig;
use crate::error::FeedError;

/// What a client is synchronised to. `thread == 0` means a board page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SyncId {
    pub thread: u64,
    pub board: String,
}

/// All synchronised clients, for addressing outside any single feed.
///
/// A client appears in a feed exactly when its entry here names that
/// feed's thread.
pub struct ClientRegistry {
    clients: RwLock<FxHashMap<ClientHandle, SyncId>>,
    /// Open connections per IP
    ips: DashMap<IpAddr, usize>,
    feeds: Arc<FeedRegistry>,
    max_per_ip: usize,
}

impl ClientRegistry {
    pub fn new(feeds: Arc<FeedRegistry>, config: &ClientsConfig) -> Self {
        Self {
            clients: RwLock::new(FxHashMap::default()),
            ips: DashMap::new(),
            feeds,
            max_per_ip: config.max_connections_per_ip,
        }
    }

    #[inline]
    pub fn feeds(&self) -> &Arc<FeedRegistry> {
        &self.feeds
    }

    // ========================================================================
    // sync targets
    // ========================================================================

    /// Point a client at a thread (or a board page when `thread` is 0).
    ///
    /// The entry swap is a single locked write, so readers see either the old
    /// or the new target. The client then leaves its old feed and joins the
    /// new one. If the new feed fails to start, the entry falls back to the
    /// board page and the error is returned.
    pub async fn sync_client(
        &self,
        client: ClientHandle,
        thread: u64,
        board: &str,
    ) -> Result<(), FeedError> {
        let target = SyncId {
            thread,
            board: board.to_owned(),
        };
        let old = self.clients.write().insert(client.clone(), target);

        if let Some(old) = old.filter(|old| old.thread != 0) {
            self.feeds.remove_client(old.thread, client.clone()).await;
        }
        if thread == 0 {
            return Ok(());
        }

        match self.feeds.add_client(thread, client.clone()).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.downgrade(&client, thread);
                crate::log!("clients"; "sync to thread {} failed: {}", thread, err);
                Err(err)
            }
        }
    }

    /// Fall back to the board page after a failed thread sync, unless the
    /// client has been pointed elsewhere in the meantime.
    fn downgrade(&self, client: &ClientHandle, thread: u64) {
        let mut clients = self.clients.write();
        if let Some(entry) = clients.get_mut(client)
            && entry.thread == thread
        {
            entry.thread = 0;
        }
    }

    /// Forget a client and unsubscribe it from its feed, if any.
    pub async fn remove_client(&self, client: &ClientHandle) {
        let old = self.clients.write().remove(client);
        if let Some(old) = old.filter(|old| old.thread != 0) {
            self.feeds.remove_client(old.thread, client.clone()).await;
        }
    }

    // ========================================================================
    // queries
    // ========================================================================

    /// Current target of a client, if synchronised.
    pub fn get_sync(&self, client: &ClientHandle) -> Option<SyncId> {
        self.clients.read().get(client).cloned()
    }

    fn collect(&self, mut pred: impl FnMut(&ClientHandle, &SyncId) -> bool) -> Vec<ClientHandle> {
        self.clients
            .read()
            .iter()
            .filter(|(client, sync)| pred(client, sync))
            .map(|(client, _)| client.clone())
            .collect()
    }

    pub fn by_ip(&self, ip: IpAddr) -> Vec<ClientHandle> {
        self.collect(|client, _| client.ip() == ip)
    }

    /// Clients of an IP on one board, or on every board for `None`.
    pub fn by_ip_and_board(&self, ip: IpAddr, board: Option<&str>) -> Vec<ClientHandle> {
        self.collect(|client, sync| {
            client.ip() == ip && board.is_none_or(|board| sync.board == board)
        })
    }

    pub fn by_thread(&self, thread: u64) -> Vec<ClientHandle> {
        self.collect(|_, sync| sync.thread == thread)
    }

    pub fn all(&self) -> Vec<ClientHandle> {
        self.clients.read().keys().cloned().collect()
    }

    /// Number of synchronised clients.
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    // ========================================================================
    // connection accounting
    // ========================================================================

    /// Count a new connection from `ip`, refusing it past the per-IP limit.
    pub fn register_ip(&self, ip: IpAddr) -> Result<(), FeedError> {
        let mut count = self.ips.entry(ip).or_insert(0);
        if self.max_per_ip != 0 && *count >= self.max_per_ip {
            crate::log!("clients"; "refusing connection from {}: {} open", ip, *count);
            return Err(FeedError::TooManyConnections(ip));
        }
        *count += 1;
        Ok(())
    }

    pub fn unregister_ip(&self, ip: IpAddr) {
        if let Entry::Occupied(mut entry) = self.ips.entry(ip) {
            let count = entry.get_mut();
            *count = count.saturating_sub(1);
            if *count == 0 {
                entry.remove();
            }
        }
    }

    /// Number of distinct connected IPs.
    pub fn ip_count(&self) -> usize {
        self.ips.len()
    }
}
