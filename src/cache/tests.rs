use proptest::prelude::*;

use super::ThreadCache;
use crate::config::FeedConfig;
use crate::model::{Image, MutationKind, Post, Thread};

fn make_thread(replies: impl IntoIterator<Item = u64>) -> Thread {
    Thread {
        id: 1,
        post_ctr: 1,
        reply_time: 10,
        bump_time: 10,
        subject: "test \"thread\"".into(),
        board: "a".into(),
        op: Post::new(1, 10),
        replies: replies.into_iter().map(|id| Post::new(id, 10 + id as i64)).collect(),
        ..Default::default()
    }
}

fn make_cache(thread: Thread) -> ThreadCache {
    ThreadCache::new(thread, &FeedConfig::default())
}

fn posts_json(frame: &[u8]) -> Vec<u64> {
    let value: serde_json::Value = serde_json::from_slice(&frame[2..]).unwrap();
    value["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect()
}

// ============================================================================
// mutations
// ============================================================================

#[test]
fn test_new_post_bumps_counters() {
    let mut cache = make_cache(make_thread([]));
    let post = Post {
        image: Some(Image::default()),
        ..Post::new(2, 50)
    };
    cache.apply_new_post(post);

    let meta = cache.meta();
    assert_eq!(meta.post_ctr, 2);
    assert_eq!(meta.image_ctr, 1);
    assert_eq!(meta.reply_time, 50);
    assert_eq!(meta.bump_time, 50);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_sage_does_not_bump() {
    let mut cache = make_cache(make_thread([]));
    cache.apply_new_post(Post {
        sage: true,
        ..Post::new(2, 50)
    });
    assert_eq!(cache.meta().reply_time, 50);
    assert_eq!(cache.meta().bump_time, 10);
    assert_eq!(cache.meta().post_ctr, 2);
}

#[test]
fn test_bump_limit() {
    let config = FeedConfig {
        bump_limit: 2,
        ..Default::default()
    };
    let mut cache = ThreadCache::new(make_thread([]), &config);

    cache.apply_new_post(Post::new(2, 20));
    assert_eq!(cache.meta().bump_time, 20);

    // post counter reached the limit
    cache.apply_new_post(Post::new(3, 30));
    assert_eq!(cache.meta().bump_time, 20);
    assert_eq!(cache.meta().reply_time, 30);
    assert_eq!(cache.meta().post_ctr, 3);
}

#[test]
fn test_reattach_keeps_counters() {
    let mut cache = make_cache(make_thread([2]));
    let before = cache.meta().clone();
    cache.reattach_post(Post {
        editing: true,
        body: "half".into(),
        ..Post::new(2, 99)
    });
    assert_eq!(cache.meta(), &before);
    assert_eq!(cache.post(2).unwrap().body, "half");
}

#[test]
fn test_image_lifecycle() {
    let mut cache = make_cache(make_thread([2]));
    assert!(cache.apply_image_insert(2, Image::default()));
    assert_eq!(cache.meta().image_ctr, 1);

    assert!(cache.apply_post_mutation(2, MutationKind::SpoilerImage));
    assert!(cache.post(2).unwrap().image.as_ref().unwrap().spoiler);

    assert!(cache.apply_post_mutation(2, MutationKind::DeleteImage));
    let post = cache.post(2).unwrap();
    assert!(post.image.is_none());
    assert!(post.image_deleted);
    assert_eq!(cache.meta().image_ctr, 0);

    // deleting again changes nothing
    assert!(cache.apply_post_mutation(2, MutationKind::DeleteImage));
    assert_eq!(cache.meta().image_ctr, 0);
}

#[test]
fn test_purge_clears_body_and_image() {
    let mut cache = make_cache(make_thread([2]));
    cache.apply_body_update(2, "text".into());
    cache.apply_image_insert(2, Image::default());
    assert!(cache.apply_post_mutation(2, MutationKind::Purge));

    let post = cache.post(2).unwrap();
    assert!(post.body.is_empty());
    assert!(post.image.is_none());
    assert_eq!(cache.meta().image_ctr, 0);
}

#[test]
fn test_thread_level_mutations() {
    let mut cache = make_cache(make_thread([]));
    assert!(cache.apply_post_mutation(0, MutationKind::Lock(true)));
    assert!(cache.apply_post_mutation(0, MutationKind::Sticky(true)));
    assert!(cache.meta().locked);
    assert!(cache.meta().sticky);
}

#[test]
fn test_unknown_post_is_ignored() {
    let mut cache = make_cache(make_thread([]));
    assert!(!cache.apply_body_update(9, "x".into()));
    assert!(!cache.apply_image_insert(9, Image::default()));
    assert!(!cache.apply_post_mutation(9, MutationKind::Ban));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.meta().image_ctr, 0);
}

// ============================================================================
// encoding
// ============================================================================

#[test]
fn test_full_thread_layout() {
    let mut cache = make_cache(make_thread([]));
    let frame = cache.encode_full_thread(false).unwrap();
    assert_eq!(
        std::str::from_utf8(&frame).unwrap(),
        concat!(
            r#"30{"sticky":false,"locked":false,"deleted":false,"postCtr":1,"imageCtr":0,"#,
            r#""time":10,"replyTime":10,"bumpTime":10,"subject":"test \"thread\"","board":"a","#,
            r#""posts":[{"id":1,"time":10,"body":""}]}"#
        )
    );
}

#[test]
fn test_full_thread_is_idempotent() {
    let mut cache = make_cache(make_thread([4, 2, 3]));
    let first = cache.encode_full_thread(false).unwrap();
    let second = cache.encode_full_thread(false).unwrap();
    assert_eq!(first, second);
    assert_eq!(posts_json(&first), vec![1, 2, 3, 4]);
}

#[test]
fn test_memo_invalidated_on_change() {
    let mut cache = make_cache(make_thread([2]));
    let before = cache.encode_full_thread(false).unwrap();
    cache.apply_body_update(2, "edited".into());
    let after = cache.encode_full_thread(false).unwrap();
    assert_ne!(before, after);

    // a fresh cache with the same content encodes the same bytes
    let mut thread = make_thread([2]);
    thread.replies[0].body = "edited".into();
    assert_eq!(make_cache(thread).encode_full_thread(false).unwrap(), after);
}

#[test]
fn test_last_n_keeps_op_and_recent_replies() {
    let mut cache = make_cache(make_thread(2..=150));
    let ids = posts_json(&cache.encode_full_thread(true).unwrap());
    assert_eq!(ids.len(), 100);
    assert_eq!(ids[0], 1);
    assert_eq!(ids[1], 52);
    assert_eq!(*ids.last().unwrap(), 150);
}

#[test]
fn test_legacy_summary() {
    let mut thread = make_thread([2, 3, 4, 5]);
    thread.replies[0].editing = true;
    thread.replies[0].body = "typing".into();
    thread.replies[0].image = Some(Image {
        spoiler: true,
        ..Default::default()
    });
    thread.replies[1].banned = true;
    thread.replies[2].deleted = true;
    let mut cache = make_cache(thread);
    cache.apply_image_insert(5, Image::default());
    cache.apply_post_mutation(5, MutationKind::DeleteImage);
    cache.apply_post_mutation(3, MutationKind::MeidoVision);

    // window of 900s, posts 4 and 5 have time 14 and 15
    let frame = cache.encode_legacy_summary_at(913).unwrap();
    assert_eq!(
        std::str::from_utf8(&frame).unwrap(),
        concat!(
            r#"30{"recent":[4,5],"banned":[3],"deleted":[4],"deletedImage":[5],"#,
            r#""meidoVision":[3],"open":{"2":{"hasImage":true,"spoilered":true,"body":"typing"}}}"#
        )
    );
}

// ============================================================================
// properties
// ============================================================================

proptest! {
    #[test]
    fn prop_posts_ascending_regardless_of_insertion(ids in prop::collection::hash_set(2u64..10_000, 0..200)) {
        let mut cache = make_cache(make_thread([]));
        for id in &ids {
            cache.apply_new_post(Post::new(*id, 0));
        }
        let out = posts_json(&cache.encode_full_thread(false).unwrap());
        prop_assert_eq!(out.len(), ids.len() + 1);
        prop_assert!(out.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(out[0], 1);
    }

    #[test]
    fn prop_last_n_shape(replies in 0u64..300) {
        let mut cache = make_cache(make_thread(2..2 + replies));
        let full = cache.encode_full_thread(false).unwrap();
        let last = cache.encode_full_thread(true).unwrap();

        if replies <= 99 {
            prop_assert_eq!(full, last);
        } else {
            let ids = posts_json(&last);
            prop_assert_eq!(ids.len(), 100);
            prop_assert_eq!(ids[0], 1);
            let expected: Vec<u64> = (2 + replies - 99..2 + replies).collect();
            prop_assert_eq!(&ids[1..], &expected[..]);
        }
    }
}
