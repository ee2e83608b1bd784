use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Heart, Post};
use crate::realtime::WallEvent;

/// How long a note that arrived over the change feed keeps its
/// "just landed" highlight.
pub const FRESH_TTL_SECS: i64 = 8;

/// A note as the board renders it, with its transient highlight state.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardPost {
    pub post: Post,
    fresh_until: Option<DateTime<Utc>>,
}

impl BoardPost {
    pub fn is_fresh(&self) -> bool {
        self.fresh_until.is_some()
    }
}

/// Reconciles a seeded snapshot of the wall with the live change feed.
///
/// Counter bumps the viewer performed locally are echoed back by the feed;
/// `local_heart` records a pending echo so the matching `HeartInserted`
/// event is swallowed instead of double-counting.
#[derive(Debug)]
pub struct BoardFeed {
    own_hash: String,
    posts: Vec<BoardPost>,
    total: u64,
    pending_echoes: HashMap<Uuid, u32>,
}

impl BoardFeed {
    pub fn seed(own_hash: String, posts: Vec<Post>, total: u64) -> Self {
        let posts = posts
            .into_iter()
            .map(|post| BoardPost {
                post,
                fresh_until: None,
            })
            .collect();

        Self {
            own_hash,
            posts,
            total,
            pending_echoes: HashMap::new(),
        }
    }

    pub fn posts(&self) -> &[BoardPost] {
        &self.posts
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Folds one feed event into the board.
    pub fn apply(&mut self, event: WallEvent, now: DateTime<Utc>) {
        match event {
            WallEvent::PostInserted(post) => self.upsert(post, true, now),
            WallEvent::PostUpdated(post) => self.upsert(post, false, now),
            WallEvent::HeartInserted(heart) => self.apply_heart(heart),
        }
    }

    /// Records a heart the viewer just placed themselves: bump the local
    /// count immediately and swallow the echo when it comes back.
    pub fn local_heart(&mut self, post_id: Uuid) {
        if let Some(entry) = self.find_mut(post_id) {
            entry.post.hearts += 1;
            *self.pending_echoes.entry(post_id).or_insert(0) += 1;
        }
    }

    /// Drops highlights whose TTL has passed. Called on a timer.
    pub fn expire_fresh(&mut self, now: DateTime<Utc>) {
        for entry in &mut self.posts {
            if entry.fresh_until.is_some_and(|until| until <= now) {
                entry.fresh_until = None;
            }
        }
    }

    fn upsert(&mut self, post: Post, inserted: bool, now: DateTime<Utc>) {
        if let Some(entry) = self.find_mut(post.id) {
            // In-place merge: counter updates must not reshuffle the board.
            entry.post = post;
            // An insert event for a known id still means the note just
            // landed, so it gets (or keeps) its highlight.
            if inserted {
                entry.fresh_until = Some(now + Duration::seconds(FRESH_TTL_SECS));
            }
            return;
        }

        // A note can reach us first through the feed and again through a
        // list refresh, so only genuinely new ids grow the total.
        if !inserted {
            return;
        }

        self.total += 1;
        self.posts.insert(
            0,
            BoardPost {
                post,
                fresh_until: Some(now + Duration::seconds(FRESH_TTL_SECS)),
            },
        );
    }

    fn apply_heart(&mut self, heart: Heart) {
        if heart.ip_hash == self.own_hash {
            if let Some(pending) = self.pending_echoes.get_mut(&heart.post_id) {
                *pending -= 1;
                if *pending == 0 {
                    self.pending_echoes.remove(&heart.post_id);
                }
                return;
            }
        }

        if let Some(entry) = self.find_mut(heart.post_id) {
            entry.post.hearts += 1;
        }
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut BoardPost> {
        self.posts.iter_mut().find(|entry| entry.post.id == id)
    }
}
