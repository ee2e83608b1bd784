use clap::Parser;
use error_stack::{Report, Result, ResultExt};

use mural::{config, database};

use super::CliError;

/// Apply pending database migrations
#[derive(Debug, Parser)]
pub struct MigrateCommand {}

pub fn run(_args: MigrateCommand) -> Result<(), CliError> {
    let config = config::Server::load().change_context(CliError)?;

    let Some(db) = config.db else {
        return Err(Report::new(CliError)
            .attach_printable("migrate needs a [db] section or DATABASE_URL to be set"));
    };

    super::build_runtime()?.block_on(async move {
        let pool = database::Pool::new(&db).await.change_context(CliError)?;
        pool.wait_until_healthy().await.change_context(CliError)?;
        pool.run_migrations().await.change_context(CliError)?;

        tracing::info!("Migrations applied");
        Ok(())
    })
}
