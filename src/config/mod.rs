use thiserror::Error;

mod database;
mod server;
mod wall;

pub use database::Database;
pub use server::{Http, Server};
pub use wall::Wall;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;
