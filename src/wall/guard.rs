use chrono::{DateTime, Duration, Utc};

use crate::store::WallStore;

pub const MAX_POSTS_PER_HOUR: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    RateLimited,
    DuplicateContent,
}

/// Rate-limit and duplicate-submission check, run after content
/// validation.
///
/// Both lookups are advisory: when one fails the guard logs and lets the
/// post through. Availability is deliberately prioritized over strict
/// enforcement here; the actual insert still has to succeed either way.
#[tracing::instrument(skip_all, name = "wall.guard")]
pub async fn check_can_post(
    store: &dyn WallStore,
    ip_hash: &str,
    text: &str,
    now: DateTime<Utc>,
) -> Decision {
    match store
        .count_posts_since(ip_hash, now - Duration::hours(1))
        .await
    {
        Ok(count) if count >= MAX_POSTS_PER_HOUR => return Decision::RateLimited,
        Ok(..) => {}
        Err(report) => {
            tracing::warn!(report = ?report, "rate limit lookup failed, letting the post through");
        }
    }

    match store
        .has_duplicate_since(ip_hash, text, now - Duration::days(1))
        .await
    {
        Ok(true) => Decision::DuplicateContent,
        Ok(false) => Decision::Allowed,
        Err(report) => {
            tracing::warn!(report = ?report, "duplicate check failed, letting the post through");
            Decision::Allowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Fault, MemoryStore, NewPost};

    fn draft(text: &str, ip_hash: &str, created_at: DateTime<Utc>) -> NewPost {
        NewPost {
            text: text.to_owned(),
            color: "#fff3a3".to_owned(),
            signature: None,
            is_anonymous: true,
            created_at,
            position_hint: created_at.timestamp_millis(),
            ip_hash: ip_hash.to_owned(),
        }
    }

    #[tokio::test]
    async fn allows_quiet_fingerprints() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let decision = check_can_post(&store, "fp-a", "a perfectly fine note", now).await;
        assert_eq!(decision, Decision::Allowed);
    }

    #[tokio::test]
    async fn denies_the_sixth_post_within_an_hour() {
        let store = MemoryStore::new();
        let now = Utc::now();

        for i in 0..5 {
            let at = now - Duration::minutes(50 - i);
            store.insert_post(draft(&format!("note number {i} here"), "fp-a", at))
                .await
                .unwrap();
        }

        let decision = check_can_post(&store, "fp-a", "one more for the road", now).await;
        assert_eq!(decision, Decision::RateLimited);

        // a different fingerprint is unaffected
        let decision = check_can_post(&store, "fp-b", "one more for the road", now).await;
        assert_eq!(decision, Decision::Allowed);
    }

    #[tokio::test]
    async fn rate_limit_window_slides() {
        let store = MemoryStore::new();
        let now = Utc::now();

        for i in 0..5 {
            let at = now - Duration::minutes(70 + i);
            store.insert_post(draft(&format!("note number {i} here"), "fp-a", at))
                .await
                .unwrap();
        }

        // all five posts fell out of the trailing hour
        let decision = check_can_post(&store, "fp-a", "fresh hour fresh note", now).await;
        assert_eq!(decision, Decision::Allowed);
    }

    #[tokio::test]
    async fn rate_limit_lookup_fails_open() {
        let store = MemoryStore::new();
        let now = Utc::now();

        for i in 0..5 {
            store.insert_post(draft(&format!("note number {i} here"), "fp-a", now))
                .await
                .unwrap();
        }

        store.fail(Fault::CountPosts);
        let decision = check_can_post(&store, "fp-a", "slips through the outage", now).await;
        assert_eq!(decision, Decision::Allowed);
    }

    #[tokio::test]
    async fn denies_duplicates_within_a_day() {
        let store = MemoryStore::new();
        let now = Utc::now();

        store.insert_post(draft("my one and only hot take", "fp-a", now - Duration::hours(2)))
            .await
            .unwrap();

        let decision = check_can_post(&store, "fp-a", "my one and only hot take", now).await;
        assert_eq!(decision, Decision::DuplicateContent);

        // exact-match only
        let decision = check_can_post(&store, "fp-a", "my one and only hot take!", now).await;
        assert_eq!(decision, Decision::Allowed);

        // same text from someone else is fine
        let decision = check_can_post(&store, "fp-b", "my one and only hot take", now).await;
        assert_eq!(decision, Decision::Allowed);
    }

    #[tokio::test]
    async fn duplicate_window_expires() {
        let store = MemoryStore::new();
        let now = Utc::now();

        store.insert_post(draft("yesterday's news today", "fp-a", now - Duration::hours(25)))
            .await
            .unwrap();

        let decision = check_can_post(&store, "fp-a", "yesterday's news today", now).await;
        assert_eq!(decision, Decision::Allowed);
    }

    #[tokio::test]
    async fn duplicate_lookup_fails_open() {
        let store = MemoryStore::new();
        let now = Utc::now();

        store.insert_post(draft("a note that already exists", "fp-a", now))
            .await
            .unwrap();

        store.fail(Fault::FindDuplicate);
        let decision = check_can_post(&store, "fp-a", "a note that already exists", now).await;
        assert_eq!(decision, Decision::Allowed);
    }
}
