//! Public post and thread projections held by the feeds.
//!
//! These are not authoritative. The persistence layer owns the real data;
//! a feed only keeps enough to regenerate wire output.

use serde::{Deserialize, Serialize};

#[inline]
fn is_false(b: &bool) -> bool {
    !*b
}

/// Image attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "is_false")]
    pub spoiler: bool,
    pub file_type: u8,
    pub thumb_type: u8,
    /// Width, height, thumbnail width, thumbnail height
    pub dims: [u16; 4],
    pub size: u64,
    pub md5: String,
    pub sha1: String,
    pub name: String,
}

/// Minimal public projection of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    /// Creation time, Unix seconds
    pub time: i64,
    #[serde(default)]
    pub body: String,
    /// Still open for live body edits
    #[serde(default, skip_serializing_if = "is_false")]
    pub editing: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub banned: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sage: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub meido_vision: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub image_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

impl Post {
    pub fn new(id: u64, time: i64) -> Self {
        Self {
            id,
            time,
            ..Default::default()
        }
    }
}

/// Full ordered thread read, as returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: u64,
    pub sticky: bool,
    pub locked: bool,
    pub post_ctr: u32,
    pub image_ctr: u32,
    pub reply_time: i64,
    pub bump_time: i64,
    pub subject: String,
    pub board: String,
    /// Opening post. Its id equals the thread id.
    pub op: Post,
    /// Replies, ascending by id
    pub replies: Vec<Post>,
}

/// Post-targeted changes applied through `PostMutation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Post finished editing
    Close,
    SpoilerImage,
    Ban,
    Delete,
    DeleteImage,
    /// Clear body and image
    Purge,
    MeidoVision,
    /// Thread level lock flag
    Lock(bool),
    /// Thread level sticky flag
    Sticky(bool),
}
