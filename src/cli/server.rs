use clap::Parser;
use error_stack::{Result, ResultExt};
use std::net::IpAddr;
use std::num::NonZeroUsize;

use mural::config;

use super::CliError;

/// Expose the wall's HTTP API
#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
}

pub fn run(args: ServerCommand) -> Result<(), CliError> {
    let mut config = config::Server::load().change_context(CliError)?;
    args.override_config(&mut config);

    super::build_runtime()?
        .block_on(mural::http::run(config))
        .change_context(CliError)
}

impl ServerCommand {
    fn override_config(&self, config: &mut config::Server) {
        if let Some(address) = self.address {
            config.http.ip = address;
        }

        if let Some(port) = self.port {
            config.http.port = port;
        }

        if let Some(workers) = self.workers {
            config.http.workers = Some(workers);
        }
    }
}
