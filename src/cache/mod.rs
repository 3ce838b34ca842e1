//! In-memory mirror of one thread.
//!
//! Owned by exactly one feed and mutated only from its loop, so nothing in
//! here is synchronized.
//!
//! ```text
//! ThreadCache
//! ├── meta       counters, flags, subject, board
//! ├── posts      id -> Post
//! └── memoized   id -> encoded Post JSON (dropped on every change to the post)
//! ```
//!
//! Encoders live in `encode` and always walk posts in ascending id order,
//! so output never depends on hash map iteration order.

mod encode;

#[cfg(test)]
mod tests;

use std::time::Duration;

use bytes::Bytes;
use rustc_hash::FxHashMap;

use crate::config::FeedConfig;
use crate::model::{Image, MutationKind, Post, Thread};

/// Thread level fields of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadMeta {
    pub id: u64,
    pub sticky: bool,
    pub locked: bool,
    pub post_ctr: u32,
    pub image_ctr: u32,
    pub reply_time: i64,
    pub bump_time: i64,
    pub subject: String,
    pub board: String,
}

#[derive(Debug, Clone)]
pub struct ThreadCache {
    meta: ThreadMeta,
    posts: FxHashMap<u64, Post>,
    memoized: FxHashMap<u64, Bytes>,
    bump_limit: u32,
    recent_window: Duration,
    snapshot_replies: usize,
}

impl ThreadCache {
    /// Build from a full thread read.
    pub fn new(thread: Thread, config: &FeedConfig) -> Self {
        let capacity = (thread.replies.len() + 1) * 2;
        let mut posts = FxHashMap::with_capacity_and_hasher(capacity, Default::default());
        posts.insert(thread.op.id, thread.op);
        for post in thread.replies {
            posts.insert(post.id, post);
        }

        Self {
            meta: ThreadMeta {
                id: thread.id,
                sticky: thread.sticky,
                locked: thread.locked,
                post_ctr: thread.post_ctr,
                image_ctr: thread.image_ctr,
                reply_time: thread.reply_time,
                bump_time: thread.bump_time,
                subject: thread.subject,
                board: thread.board,
            },
            posts,
            memoized: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            bump_limit: config.bump_limit,
            recent_window: config.recent_window(),
            snapshot_replies: config.snapshot_replies,
        }
    }

    #[inline]
    pub fn meta(&self) -> &ThreadMeta {
        &self.meta
    }

    #[inline]
    pub fn post(&self, id: u64) -> Option<&Post> {
        self.posts.get(&id)
    }

    /// Number of cached posts, opening post included.
    #[inline]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    #[inline]
    fn invalidate(&mut self, id: u64) {
        self.memoized.remove(&id);
    }

    /// Insert a new reply and advance the thread counters.
    ///
    /// Sage replies and replies past the bump limit do not move `bump_time`.
    pub fn apply_new_post(&mut self, post: Post) {
        self.meta.reply_time = post.time;
        if !post.sage && self.meta.post_ctr < self.bump_limit {
            self.meta.bump_time = post.time;
        }
        self.meta.post_ctr += 1;
        if post.image.is_some() {
            self.meta.image_ctr += 1;
        }

        self.invalidate(post.id);
        self.posts.insert(post.id, post);
    }

    /// Replace a post reclaimed by a reconnecting author. Counters stay.
    pub fn reattach_post(&mut self, post: Post) {
        self.invalidate(post.id);
        self.posts.insert(post.id, post);
    }

    /// Returns `false` if the post is not cached.
    pub fn apply_body_update(&mut self, id: u64, body: String) -> bool {
        let Some(post) = self.posts.get_mut(&id) else {
            return false;
        };
        post.body = body;
        self.invalidate(id);
        true
    }

    /// Returns `false` if the post is not cached.
    pub fn apply_image_insert(&mut self, id: u64, image: Image) -> bool {
        let Some(post) = self.posts.get_mut(&id) else {
            return false;
        };
        if post.image.replace(image).is_none() {
            self.meta.image_ctr += 1;
        }
        self.invalidate(id);
        true
    }

    /// Apply a moderation or lifecycle change.
    ///
    /// Thread level kinds always apply. Post level kinds return `false` if
    /// the post is not cached.
    pub fn apply_post_mutation(&mut self, id: u64, kind: MutationKind) -> bool {
        match kind {
            MutationKind::Lock(locked) => {
                self.meta.locked = locked;
                return true;
            }
            MutationKind::Sticky(sticky) => {
                self.meta.sticky = sticky;
                return true;
            }
            _ => {}
        }

        let Some(post) = self.posts.get_mut(&id) else {
            return false;
        };
        let mut image_removed = false;
        match kind {
            MutationKind::Close => post.editing = false,
            MutationKind::SpoilerImage => {
                if let Some(image) = post.image.as_mut() {
                    image.spoiler = true;
                }
            }
            MutationKind::Ban => post.banned = true,
            MutationKind::Delete => post.deleted = true,
            MutationKind::DeleteImage => {
                if post.image.take().is_some() {
                    post.image_deleted = true;
                    image_removed = true;
                }
            }
            MutationKind::Purge => {
                post.body.clear();
                image_removed = post.image.take().is_some();
            }
            MutationKind::MeidoVision => post.meido_vision = true,
            MutationKind::Lock(_) | MutationKind::Sticky(_) => {}
        }
        if image_removed {
            self.meta.image_ctr = self.meta.image_ctr.saturating_sub(1);
        }
        self.invalidate(id);
        true
    }
}
