use actix_web::web;

pub mod posts;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(posts::list))
            .route("", web::post().to(posts::create))
            .route("/{id}", web::get().to(posts::get))
            .route("/{id}/heart", web::post().to(posts::heart))
            .route("/{id}/share", web::post().to(posts::share))
            .route("/{id}/report", web::post().to(posts::report)),
    );
}
