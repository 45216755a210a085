use actix_multipart::form::{tempfile::TempFile, MultipartForm};

/// Multipart form for a batch upload: every part is sent under `files`
#[derive(MultipartForm)]
pub struct UploadForm {
    /// Uploaded files, spooled to temporary files by actix-multipart
    #[multipart(limit = "500MiB")]
    pub files: Vec<TempFile>,
}
