use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_stack::Report;
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

use super::{NewPost, StoreError, StoreResult, WallStore};
use crate::models::{Heart, Post, PostReport};

/// Operations that can be made to fail on demand, so the fail-open and
/// fallback paths of the guard and the counters can be tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    ListRecent,
    PostById,
    InsertPost,
    CountPosts,
    FindDuplicate,
    FindHeart,
    InsertHeart,
    IncrementHearts,
    IncrementShares,
    ReadHearts,
    WriteHearts,
    ReadShares,
    WriteShares,
    InsertReport,
}

#[derive(Debug, Default)]
struct State {
    posts: Vec<Post>,
    hearts: Vec<Heart>,
    reports: Vec<PostReport>,
}

/// Deterministic in-memory [`WallStore`] used by the test suite.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    faults: Mutex<HashSet<Fault>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call to the faulted operation fail until
    /// [`MemoryStore::heal`] is called.
    pub fn fail(&self, fault: Fault) {
        self.faults.lock().unwrap().insert(fault);
    }

    pub fn heal(&self, fault: Fault) {
        self.faults.lock().unwrap().remove(&fault);
    }

    fn check(&self, fault: Fault) -> StoreResult<()> {
        if self.faults.lock().unwrap().contains(&fault) {
            Err(Report::new(StoreError))
        } else {
            Ok(())
        }
    }

    /// Test helper: the stored row, bypassing the trait surface.
    pub fn post(&self, id: Uuid) -> Option<Post> {
        self.state
            .lock()
            .unwrap()
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn heart_count(&self, post_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .hearts
            .iter()
            .filter(|h| h.post_id == post_id)
            .count()
    }

    pub fn report_count(&self, post_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .reports
            .iter()
            .filter(|r| r.post_id == post_id)
            .count()
    }
}

#[async_trait]
impl WallStore for MemoryStore {
    async fn list_recent(&self, limit: i64) -> StoreResult<(Vec<Post>, u64)> {
        self.check(Fault::ListRecent)?;
        let state = self.state.lock().unwrap();

        let mut items = state.posts.clone();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.position.cmp(&a.position))
        });
        items.truncate(limit.max(0) as usize);

        Ok((items, state.posts.len() as u64))
    }

    async fn post_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        self.check(Fault::PostById)?;
        Ok(self.post(id))
    }

    async fn insert_post(&self, new: NewPost) -> StoreResult<Post> {
        self.check(Fault::InsertPost)?;
        let mut state = self.state.lock().unwrap();

        let last = state.posts.iter().map(|p| p.position).max().unwrap_or(0);
        let post = Post {
            id: Uuid::new_v4(),
            text: new.text,
            color: new.color,
            signature: new.signature,
            is_anonymous: new.is_anonymous,
            created_at: new.created_at,
            hearts: 0,
            shares: 0,
            position: new.position_hint.max(last + 1),
            ip_hash: new.ip_hash,
        };

        state.posts.push(post.clone());
        Ok(post)
    }

    async fn count_posts_since(&self, ip_hash: &str, since: DateTime<Utc>) -> StoreResult<u64> {
        self.check(Fault::CountPosts)?;
        let state = self.state.lock().unwrap();

        Ok(state
            .posts
            .iter()
            .filter(|p| p.ip_hash == ip_hash && p.created_at >= since)
            .count() as u64)
    }

    async fn has_duplicate_since(
        &self,
        ip_hash: &str,
        text: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.check(Fault::FindDuplicate)?;
        let state = self.state.lock().unwrap();

        Ok(state
            .posts
            .iter()
            .any(|p| p.ip_hash == ip_hash && p.text == text && p.created_at >= since))
    }

    async fn find_heart(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<Option<Heart>> {
        self.check(Fault::FindHeart)?;
        let state = self.state.lock().unwrap();

        Ok(state
            .hearts
            .iter()
            .find(|h| h.post_id == post_id && h.ip_hash == ip_hash)
            .cloned())
    }

    async fn insert_heart(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<Heart> {
        self.check(Fault::InsertHeart)?;
        let mut state = self.state.lock().unwrap();

        let heart = Heart {
            id: Uuid::new_v4(),
            post_id,
            ip_hash: ip_hash.to_owned(),
            created_at: Utc::now(),
        };
        state.hearts.push(heart.clone());
        Ok(heart)
    }

    async fn increment_hearts(&self, post_id: Uuid) -> StoreResult<bool> {
        self.check(Fault::IncrementHearts)?;
        let mut state = self.state.lock().unwrap();

        match state.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.hearts += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment_shares(&self, post_id: Uuid) -> StoreResult<bool> {
        self.check(Fault::IncrementShares)?;
        let mut state = self.state.lock().unwrap();

        match state.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.shares += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hearts_of(&self, post_id: Uuid) -> StoreResult<Option<i64>> {
        self.check(Fault::ReadHearts)?;
        Ok(self.post(post_id).map(|p| p.hearts))
    }

    async fn set_hearts(&self, post_id: Uuid, value: i64) -> StoreResult<bool> {
        self.check(Fault::WriteHearts)?;
        let mut state = self.state.lock().unwrap();

        match state.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.hearts = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn shares_of(&self, post_id: Uuid) -> StoreResult<Option<i64>> {
        self.check(Fault::ReadShares)?;
        Ok(self.post(post_id).map(|p| p.shares))
    }

    async fn set_shares(&self, post_id: Uuid, value: i64) -> StoreResult<bool> {
        self.check(Fault::WriteShares)?;
        let mut state = self.state.lock().unwrap();

        match state.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.shares = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_report(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<PostReport> {
        self.check(Fault::InsertReport)?;
        let mut state = self.state.lock().unwrap();

        let report = PostReport {
            id: Uuid::new_v4(),
            post_id,
            ip_hash: ip_hash.to_owned(),
            created_at: Utc::now(),
        };
        state.reports.push(report.clone());
        Ok(report)
    }
}
