use crate::handlers::error::handle_server_error;
use crate::handlers::upload_form::UploadForm;
use crate::handlers::ApiResult;
use crate::state::AppState;
use actix_multipart::form::MultipartForm;
use actix_web::{post, web, HttpRequest, HttpResponse};
use common::identity::identity_from_peer;
use common::UploadResponse;
use storage::IncomingFile;
use tracing::info;

/// Accept a batch of files (multipart/form-data, repeated `files` field)
#[post("/upload")]
pub async fn upload(
    req: HttpRequest,
    form: MultipartForm<UploadForm>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let UploadForm { files } = form.into_inner();
    let identity = identity_from_peer(req.peer_addr());

    info!(
        count = files.len(),
        uploaded_by = ?identity,
        "POST /upload - Request received"
    );

    // Temp files stay alive in `files` until the batch is stored
    let mut batch = Vec::with_capacity(files.len());
    for temp in &files {
        let content = tokio::fs::File::open(temp.file.path())
            .await
            .map_err(|e| handle_server_error("Failed to read uploaded file", e))?;
        batch.push(IncomingFile {
            declared_name: temp.file_name.clone().unwrap_or_default(),
            size: temp.size as u64,
            content,
        });
    }

    let stored = state.ingestor.ingest(batch, identity.as_deref()).await?;

    info!(
        count = stored.len(),
        uploaded_by = ?identity,
        "POST /upload - Batch stored"
    );

    Ok(HttpResponse::Created().json(UploadResponse {
        success: true,
        files: stored,
    }))
}
