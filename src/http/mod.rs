use actix_web::{web, HttpServer};
use error_stack::{Result, ResultExt};
use tracing_actix_web::TracingLogger;

pub mod controllers;
pub mod error;
pub mod util;

pub use error::{Error, StartServerError};

use crate::{config, App};

/// Builds the [`App`] and serves the wall API until shutdown.
pub async fn run(config: config::Server) -> Result<(), StartServerError> {
    let workers = config.http.workers;
    let addr = (config.http.ip, config.http.port);

    let app = App::new(config).await.change_context(StartServerError)?;
    tracing::info!(ip = %addr.0, port = addr.1, "Serving the wall");

    let mut server = HttpServer::new(move || {
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .wrap(TracingLogger::default())
            .configure(controllers::configure)
    });

    if let Some(workers) = workers {
        server = server.workers(workers.get());
    }

    server
        .bind(addr)
        .change_context(StartServerError)
        .attach_printable("could not bind the listen address")?
        .run()
        .await
        .change_context(StartServerError)
}
