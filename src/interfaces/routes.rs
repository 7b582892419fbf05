use actix_web::web;

use crate::handlers::home::home;

mod admin;
mod auth;
mod contact;
mod json_error;
mod media;
mod projects;

/// Mounts the public banner and the `/api/v1` surface.
///
/// `max_upload_bytes` bounds multipart bodies on the media route.
pub fn configure_routes(cfg: &mut web::ServiceConfig, max_upload_bytes: usize) {
    cfg.service(home);

    cfg.service(
        web::scope("/api/v1")
            .configure(auth::config_routes)
            .configure(projects::config_routes)
            .configure(contact::config_routes)
            .configure(|cfg| media::config_routes(cfg, max_upload_bytes))
            .configure(admin::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
