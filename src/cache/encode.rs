//! Snapshot and legacy summary encoders.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::Serialize;

use super::ThreadCache;
use crate::protocol::{MessageType, encode_message};

/// Catch-up digest for clients that keep their own copy of the thread.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncSummary<'a> {
    recent: Vec<u64>,
    banned: Vec<u64>,
    deleted: Vec<u64>,
    deleted_image: Vec<u64>,
    meido_vision: Vec<u64>,
    open: BTreeMap<u64, OpenPost<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OpenPost<'a> {
    has_image: bool,
    spoilered: bool,
    body: &'a str,
}

impl ThreadCache {
    fn sorted_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.posts.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids included in a snapshot: everything, or the opening post plus the
    /// most recent `snapshot_replies` replies.
    pub(crate) fn snapshot_ids(&self, last_n: bool) -> Vec<u64> {
        let ids = self.sorted_ids();
        if !last_n {
            return ids;
        }

        let op = self.meta.id;
        let replies: Vec<u64> = ids.iter().copied().filter(|id| *id != op).collect();
        if replies.len() <= self.snapshot_replies {
            return ids;
        }

        let mut out = Vec::with_capacity(self.snapshot_replies + 1);
        if self.posts.contains_key(&op) {
            out.push(op);
        }
        out.extend_from_slice(&replies[replies.len() - self.snapshot_replies..]);
        out
    }

    /// Encoded JSON of one post, from the memo if still valid.
    fn encoded_post(&mut self, id: u64) -> serde_json::Result<Option<Bytes>> {
        if let Some(mem) = self.memoized.get(&id) {
            return Ok(Some(mem.clone()));
        }
        let Some(post) = self.posts.get(&id) else {
            return Ok(None);
        };
        let mem = Bytes::from(serde_json::to_vec(post)?);
        self.memoized.insert(id, mem.clone());
        Ok(Some(mem))
    }

    /// Render the whole thread as a `Synchronise` frame.
    ///
    /// Byte-identical for identical cache content. Fills the per-post memo.
    pub fn encode_full_thread(&mut self, last_n: bool) -> serde_json::Result<Bytes> {
        let ids = self.snapshot_ids(last_n);
        let (op_deleted, op_time) = self
            .posts
            .get(&self.meta.id)
            .map(|op| (op.deleted, op.time))
            .unwrap_or_default();

        let mut b: Vec<u8> = Vec::with_capacity(256 + ids.len() * 128);
        b.extend_from_slice(&MessageType::Synchronise.tag());

        let meta = &self.meta;
        write!(
            b,
            r#"{{"sticky":{},"locked":{},"deleted":{},"postCtr":{},"imageCtr":{},"time":{},"replyTime":{},"bumpTime":{},"subject":"#,
            meta.sticky,
            meta.locked,
            op_deleted,
            meta.post_ctr,
            meta.image_ctr,
            op_time,
            meta.reply_time,
            meta.bump_time,
        )
        .map_err(serde_json::Error::io)?;
        serde_json::to_writer(&mut b, &meta.subject)?;
        b.extend_from_slice(br#","board":"#);
        serde_json::to_writer(&mut b, &meta.board)?;
        b.extend_from_slice(br#","posts":["#);

        let mut first = true;
        for id in ids {
            let Some(mem) = self.encoded_post(id)? else {
                continue;
            };
            if !first {
                b.push(b',');
            }
            first = false;
            b.extend_from_slice(&mem);
        }
        b.extend_from_slice(b"]}");

        Ok(Bytes::from(b))
    }

    /// Legacy catch-up summary relative to the current wall clock.
    pub fn encode_legacy_summary(&self) -> serde_json::Result<Bytes> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        self.encode_legacy_summary_at(now)
    }

    /// Legacy catch-up summary, with `now` in Unix seconds.
    pub fn encode_legacy_summary_at(&self, now: i64) -> serde_json::Result<Bytes> {
        let threshold = now - self.recent_window.as_secs() as i64;
        let mut msg = SyncSummary {
            recent: Vec::new(),
            banned: Vec::new(),
            deleted: Vec::new(),
            deleted_image: Vec::new(),
            meido_vision: Vec::new(),
            open: BTreeMap::new(),
        };

        for id in self.sorted_ids() {
            let Some(p) = self.posts.get(&id) else {
                continue;
            };
            if p.time > threshold {
                msg.recent.push(id);
            }
            if p.editing {
                msg.open.insert(
                    id,
                    OpenPost {
                        has_image: p.image.is_some(),
                        spoilered: p.image.as_ref().is_some_and(|img| img.spoiler),
                        body: &p.body,
                    },
                );
            }
            if p.banned {
                msg.banned.push(id);
            }
            if p.deleted {
                msg.deleted.push(id);
            }
            if p.image_deleted {
                msg.deleted_image.push(id);
            }
            if p.meido_vision {
                msg.meido_vision.push(id);
            }
        }

        encode_message(MessageType::Synchronise, &msg)
    }
}
