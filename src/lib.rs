pub mod app;
pub mod config;
pub mod database;
pub mod http;
pub mod models;
pub mod realtime;
pub mod store;
pub mod wall;

pub use app::App;
