use clap::Parser;
use error_stack::{Report, Result, ResultExt};
use std::time::Duration;

use mural::realtime::{BoardFeed, WallEvent, WallListener};
use mural::wall::fingerprint::fingerprint;
use mural::wall::posts;
use mural::{config, App};

use super::CliError;

/// Follow the wall's live change feed from a terminal
#[derive(Debug, Parser)]
pub struct WatchCommand {}

pub fn run(_args: WatchCommand) -> Result<(), CliError> {
    let config = config::Server::load().change_context(CliError)?;

    let Some(db) = config.db.as_ref() else {
        return Err(Report::new(CliError)
            .attach_printable("watch needs a [db] section or DATABASE_URL to be set"));
    };
    let db_url = db.url.clone();

    super::build_runtime()?.block_on(watch(config, db_url))
}

async fn watch(config: config::Server, db_url: String) -> Result<(), CliError> {
    let salt = config.wall.ip_salt.clone();
    let app = App::new(config).await.change_context(CliError)?;

    // `store()` is always present here, `run` already checked for [db]
    let store = app.store().ok_or_else(|| Report::new(CliError))?;
    let (posts, total) = posts::list_recent(store.as_ref())
        .await
        .change_context(CliError)?;

    // The watcher has no client address of its own, so it observes under
    // the sentinel fingerprint and never swallows anyone's echo.
    let mut feed = BoardFeed::seed(fingerprint(None, &salt), posts, total);
    tracing::info!(posts = feed.posts().len(), total = feed.total(), "Board seeded");

    let mut listener = WallListener::connect(&db_url)
        .await
        .change_context(CliError)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            event = listener.recv() => {
                let event = event.change_context(CliError)?;
                report(&event);
                feed.apply(event, chrono::Utc::now());
            }
            _ = ticker.tick() => {
                feed.expire_fresh(chrono::Utc::now());
            }
        }
    }
}

fn report(event: &WallEvent) {
    match event {
        WallEvent::PostInserted(post) => {
            tracing::info!(id = %post.id, text = %post.text, "New note on the wall");
        }
        WallEvent::PostUpdated(post) => {
            tracing::info!(
                id = %post.id,
                hearts = post.hearts,
                shares = post.shares,
                "Note updated",
            );
        }
        WallEvent::HeartInserted(heart) => {
            tracing::info!(post_id = %heart.post_id, "Note hearted");
        }
    }
}
