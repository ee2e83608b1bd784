use error_stack::Report;
use uuid::Uuid;

use crate::store::{StoreError, StoreResult, WallStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartOutcome {
    /// Heart recorded and the visible counter incremented.
    Hearted,
    /// This fingerprint already hearted the post; nothing was counted.
    AlreadyHearted,
    /// Heart recorded but the visible counter could not be updated. The
    /// Heart row is the durable fact; the counter will catch up.
    CounterLagging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    CounterLagging,
}

/// At-most-once heart per (post, fingerprint).
///
/// The Heart row insert is the durability boundary. The counter bump runs
/// atomically first; if the datastore refuses, a read-modify-write repair
/// is attempted, and if even that fails the operation still reports
/// partial success since the idempotency record was written.
#[tracing::instrument(skip(store, ip_hash), name = "wall.heart")]
pub async fn heart(
    store: &dyn WallStore,
    post_id: Uuid,
    ip_hash: &str,
) -> StoreResult<HeartOutcome> {
    // This read defines idempotency, so it fails closed: proceeding blind
    // could count the same fingerprint twice.
    if store.find_heart(post_id, ip_hash).await?.is_some() {
        return Ok(HeartOutcome::AlreadyHearted);
    }

    store.insert_heart(post_id, ip_hash).await?;

    match store.increment_hearts(post_id).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(Report::new(StoreError).attach_printable("heart target does not exist"))
        }
        Err(report) => {
            tracing::warn!(report = ?report, %post_id, "atomic heart increment failed, repairing");

            let current = match store.hearts_of(post_id).await {
                Ok(Some(current)) => current,
                Ok(None) => return Ok(HeartOutcome::CounterLagging),
                Err(report) => {
                    tracing::warn!(report = ?report, %post_id, "heart counter repair failed");
                    return Ok(HeartOutcome::CounterLagging);
                }
            };

            if let Err(report) = store.set_hearts(post_id, current + 1).await {
                tracing::warn!(report = ?report, %post_id, "heart counter repair failed");
                return Ok(HeartOutcome::CounterLagging);
            }
        }
    }

    Ok(HeartOutcome::Hearted)
}

/// Unconditional share bump. No idempotency key; shares are a vanity
/// metric and the degraded read-modify-write path knowingly races.
#[tracing::instrument(skip(store), name = "wall.share")]
pub async fn share(store: &dyn WallStore, post_id: Uuid) -> StoreResult<ShareOutcome> {
    match store.increment_shares(post_id).await {
        Ok(true) => Ok(ShareOutcome::Shared),
        Ok(false) => {
            Err(Report::new(StoreError).attach_printable("share target does not exist"))
        }
        Err(report) => {
            tracing::warn!(report = ?report, %post_id, "atomic share increment failed, repairing");

            let current = store
                .shares_of(post_id)
                .await?
                .ok_or_else(|| Report::new(StoreError).attach_printable("share target does not exist"))?;

            if let Err(report) = store.set_shares(post_id, current + 1).await {
                tracing::warn!(report = ?report, %post_id, "share counter repair failed");
                return Ok(ShareOutcome::CounterLagging);
            }

            Ok(ShareOutcome::Shared)
        }
    }
}

/// Appends to the report log. Repeated reports from one fingerprint are
/// accepted as-is.
#[tracing::instrument(skip(store, ip_hash), name = "wall.report")]
pub async fn report(store: &dyn WallStore, post_id: Uuid, ip_hash: &str) -> StoreResult<()> {
    store.insert_report(post_id, ip_hash).await.map(|_| ())
}
