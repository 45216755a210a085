use crate::handlers::error::{handle_not_found, handle_server_error, ApiError};
use crate::handlers::ApiResult;
use crate::state::AppState;
use actix_web::http::header::{
    Charset, ContentDisposition, ContentType, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{get, web, HttpResponse};
use common::file_utils::sanitize_requested_name;
use tokio_util::io::ReaderStream;
use tracing::info;

/// Stream one stored file back as an attachment
#[get("/download/{filename}")]
pub async fn download(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let requested = path.into_inner();

    // Debug formatter (?) escapes control characters in client input
    info!(filename = ?requested, "GET /download - Request received");

    let filename = sanitize_requested_name(&requested)
        .map_err(|e| ApiError::bad_request(e.message()))?;

    let file = state
        .bounded(state.storage.stat(filename))
        .await
        .map_err(|e| handle_server_error("Failed to check file", e))?
        .ok_or_else(|| handle_not_found("GET /download - No such file", filename))?;

    let handle = state.bounded(state.storage.open_file(filename)).await?;

    info!(filename = ?filename, size = file.size, "GET /download - Sending file");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::octet_stream())
        .insert_header(attachment(filename))
        .no_chunking(file.size)
        .streaming(ReaderStream::new(handle)))
}

/// `Content-Disposition: attachment` naming `filename`.
///
/// Non-ASCII names get an ASCII fallback plus an RFC 5987 `filename*`.
pub fn attachment(filename: &str) -> ContentDisposition {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() && c != '"' { c } else { '_' })
        .collect();

    let mut parameters = vec![DispositionParam::Filename(fallback)];
    if !filename.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: filename.as_bytes().to_vec(),
        }));
    }

    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}
