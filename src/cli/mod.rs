use clap::Parser;
use error_stack::{Result, ResultExt};
use thiserror::Error;

mod migrate;
mod server;
mod watch;

/// Command line options for the mural wall.
#[derive(Debug, Parser)]
#[command(about = "Utility suite for the mural wall backend", version, author)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(Debug, Error)]
#[error("command failed")]
pub struct CliError;

impl Cli {
    pub fn run(self) -> Result<(), CliError> {
        init_tracing();

        match self.subcommand {
            Subcommand::Server(args) => server::run(args),
            Subcommand::Watch(args) => watch::run(args),
            Subcommand::Migrate(args) => migrate::run(args),
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    /// Expose the wall's HTTP API
    Server(server::ServerCommand),
    /// Follow the wall's live change feed from a terminal
    Watch(watch::WatchCommand),
    /// Apply pending database migrations
    Migrate(migrate::MigrateCommand),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

fn build_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .change_context(CliError)
        .attach_printable("could not build tokio runtime")
}
