use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::handlers::media;

/// Small in-memory allowance for the text fields; the file itself spools to disk.
const MULTIPART_MEMORY_LIMIT: usize = 64 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig, max_upload_bytes: usize) {
    cfg.service(
        web::resource("/media")
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(max_upload_bytes + MULTIPART_MEMORY_LIMIT)
                    .memory_limit(MULTIPART_MEMORY_LIMIT)
            )
            .route(web::post().to(media::upload_media))
    );
}
