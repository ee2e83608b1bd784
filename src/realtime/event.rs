use error_stack::Report;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Heart, Post};

/// NOTIFY channel the migrations wire the wall triggers to.
pub const CHANNEL: &str = "wall_events";

/// One change-feed notification: `{table, event, row}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    table: String,
    event: String,
    row: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WallEvent {
    PostInserted(Post),
    PostUpdated(Post),
    HeartInserted(Heart),
}

#[derive(Debug, Error)]
#[error("failed to decode wall event payload")]
pub struct DecodeError;

/// Decodes one notification payload. Tables and event kinds the board does
/// not consume decode to `None` and are skipped upstream; only malformed
/// payloads are an error.
pub fn decode(payload: &str) -> error_stack::Result<Option<WallEvent>, DecodeError> {
    let envelope: Envelope =
        serde_json::from_str(payload).map_err(|e| Report::new(e).change_context(DecodeError))?;

    let event = match (envelope.table.as_str(), envelope.event.as_str()) {
        ("posts", "insert") => Some(WallEvent::PostInserted(decode_row(envelope.row)?)),
        ("posts", "update") => Some(WallEvent::PostUpdated(decode_row(envelope.row)?)),
        ("hearts", "insert") => Some(WallEvent::HeartInserted(decode_row(envelope.row)?)),
        _ => None,
    };

    Ok(event)
}

fn decode_row<T: serde::de::DeserializeOwned>(
    row: serde_json::Value,
) -> error_stack::Result<T, DecodeError> {
    serde_json::from_value(row).map_err(|e| Report::new(e).change_context(DecodeError))
}
