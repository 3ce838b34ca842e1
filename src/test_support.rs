//! Shared fixtures for async tests.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::client::{Capabilities, Client, ClientHandle};
use crate::error::StoreError;
use crate::model::{Post, Thread};
use crate::store::{MemoryStore, ThreadStore};

/// Client that records every frame it is sent.
pub(crate) struct RecordingClient {
    ip: IpAddr,
    caps: Capabilities,
    tx: mpsc::UnboundedSender<Bytes>,
}

impl Client for RecordingClient {
    fn send(&self, frame: Bytes) {
        let _ = self.tx.send(frame);
    }

    fn ip(&self) -> IpAddr {
        self.ip
    }

    fn capabilities(&self) -> Capabilities {
        self.caps
    }
}

pub(crate) fn ip(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
}

pub(crate) fn recording_client(last: u8) -> (ClientHandle, mpsc::UnboundedReceiver<Bytes>) {
    recording_client_with(last, Capabilities::default())
}

pub(crate) fn recording_client_with(
    last: u8,
    caps: Capabilities,
) -> (ClientHandle, mpsc::UnboundedReceiver<Bytes>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let client = RecordingClient {
        ip: ip(last),
        caps,
        tx,
    };
    (ClientHandle::new(client), rx)
}

/// Thread with opening post `id` at time 10 and the given reply ids.
pub(crate) fn make_thread(id: u64, replies: impl IntoIterator<Item = u64>) -> Thread {
    Thread {
        id,
        post_ctr: 1,
        reply_time: 10,
        bump_time: 10,
        board: "a".into(),
        op: Post::new(id, 10),
        replies: replies
            .into_iter()
            .map(|r| Post::new(r, 10 + r as i64))
            .collect(),
        ..Default::default()
    }
}

/// Store that counts reads.
#[derive(Default)]
pub(crate) struct CountingStore {
    pub(crate) inner: MemoryStore,
    fetches: AtomicUsize,
}

impl CountingStore {
    pub(crate) fn with_threads(threads: impl IntoIterator<Item = Thread>) -> Arc<Self> {
        let store = Self::default();
        for thread in threads {
            store.inner.insert(thread);
        }
        Arc::new(store)
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ThreadStore for CountingStore {
    fn thread(&self, id: u64) -> Result<Thread, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.thread(id)
    }
}

/// Parse the `posts` ids out of a `Synchronise` snapshot frame.
pub(crate) fn snapshot_ids(frame: &[u8]) -> Vec<u64> {
    assert_eq!(&frame[..2], b"30", "not a sync frame");
    let value: serde_json::Value = serde_json::from_slice(&frame[2..]).unwrap();
    value["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect()
}
