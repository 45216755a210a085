use crate::handlers::download::attachment;
use crate::handlers::error::ApiError;
use crate::handlers::ApiResult;
use crate::state::AppState;
use actix_web::http::header::ContentType;
use actix_web::{get, post, web, HttpResponse};
use common::ZipDownloadRequest;
use tracing::info;

/// Bundle the selected files into one zip attachment
#[post("/zip-download")]
pub async fn zip_download(
    body: web::Json<ZipDownloadRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let ZipDownloadRequest { filenames } = body.into_inner();

    info!(
        requested = filenames.len(),
        "POST /zip-download - Request received"
    );

    if filenames.is_empty() {
        return Err(ApiError::bad_request("Select at least one file"));
    }

    let archive = state.archives.build(&filenames).await?;

    info!(
        archive = %archive.filename,
        entries = archive.entries.len(),
        size = archive.bytes.len(),
        "POST /zip-download - Archive built"
    );

    Ok(HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header(attachment(&archive.filename))
        .body(archive.bytes))
}

/// Opening the archive URL directly in a browser
#[get("/zip-download")]
pub async fn zip_download_notice() -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type(ContentType::plaintext())
        .body("This address only accepts POST requests. Use the \"Download selected (ZIP)\" button in the file list.")
}
