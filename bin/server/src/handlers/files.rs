use crate::handlers::error::handle_server_error;
use crate::handlers::ApiResult;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use common::FileEntry;
use storage::StorageError;
use tracing::debug;

/// List the drop directory, joined with the recorded uploader of each file
#[get("/files")]
pub async fn list_files(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let files = match state.bounded(state.storage.list()).await {
        Ok(files) => files,
        // Directory removed from under us: nothing to show
        Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(handle_server_error("Failed to list files", e)),
    };
    let metadata = state.metadata.load().await;

    let entries: Vec<FileEntry> = files
        .into_iter()
        .map(|file| {
            let record = metadata.get(&file.name);
            FileEntry {
                uploaded_by: record.and_then(|r| r.uploaded_by.clone()),
                uploaded_at: record.map(|r| r.uploaded_at).unwrap_or(file.modified),
                name: file.name,
                size: file.size,
                modified: file.modified,
            }
        })
        .collect();

    debug!(count = entries.len(), "GET /files - Listing returned");
    Ok(HttpResponse::Ok().json(entries))
}
