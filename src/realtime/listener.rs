use error_stack::{Result, ResultExt};
use sqlx::postgres::PgListener;
use thiserror::Error;

use crate::realtime::{event, WallEvent};

#[derive(Debug, Error)]
#[error("failed to listen for wall events")]
pub struct ListenError;

/// Subscription to the wall's NOTIFY channel.
pub struct WallListener {
    listener: PgListener,
}

impl WallListener {
    #[tracing::instrument(skip_all)]
    pub async fn connect(url: &str) -> Result<Self, ListenError> {
        let mut listener = PgListener::connect(url)
            .await
            .change_context(ListenError)?;

        listener
            .listen(event::CHANNEL)
            .await
            .change_context(ListenError)?;

        tracing::debug!(channel = event::CHANNEL, "Listening for wall events");
        Ok(Self { listener })
    }

    /// Waits for the next event the board consumes. Notifications for other
    /// tables are skipped; malformed payloads are logged and skipped so one
    /// bad notification cannot wedge the feed.
    #[tracing::instrument(skip_all)]
    pub async fn recv(&mut self) -> Result<WallEvent, ListenError> {
        loop {
            let notification = self
                .listener
                .recv()
                .await
                .change_context(ListenError)?;

            match event::decode(notification.payload()) {
                Ok(Some(event)) => return Ok(event),
                Ok(None) => continue,
                Err(error) => {
                    tracing::warn!(%error, "Skipping undecodable wall event");
                }
            }
        }
    }
}
