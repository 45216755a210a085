//! HTTP request handlers

pub mod archive;
pub mod download;
pub mod error;
pub mod files;
pub mod health;
pub mod info;
pub mod settings;
pub mod upload;
pub mod upload_form;

use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::web;
use storage::{MAX_FILES_PER_BATCH, MAX_FILE_SIZE};

pub type ApiResult<T> = Result<T, error::ApiError>;

/// Largest multipart body accepted: a full batch of maximum-size files,
/// clamped to the address space
pub fn upload_total_limit() -> usize {
    (MAX_FILES_PER_BATCH as u64)
        .checked_mul(MAX_FILE_SIZE)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .unwrap_or(usize::MAX)
}

/// Any origin may call the API; browser clients are not served from here
pub fn cors() -> Cors {
    Cors::permissive()
}

/// Register every route and the extractor configuration they rely on
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(
            MultipartFormConfig::default()
                .total_limit(upload_total_limit())
                .memory_limit(2 * 1024 * 1024)
                .error_handler(error::multipart_error_handler),
        )
        .service(files::list_files)
        .service(download::download)
        .service(upload::upload)
        .service(archive::zip_download)
        .service(archive::zip_download_notice)
        .service(settings::get_settings)
        .service(settings::update_settings)
        .service(info::my_ip)
        .service(info::server_info)
        .service(health::health);
}
