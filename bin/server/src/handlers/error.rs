use actix_multipart::MultipartError;
use actix_web::error::{JsonPayloadError, PayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use common::ErrorResponse;
use std::fmt;
use storage::StorageError;
use tracing::{error, warn};

/// An error answered with a JSON `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorResponse {
            error: self.message.clone(),
        })
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Validation(msg) => {
                warn!("Rejected request: {}", msg);
                ApiError::bad_request(msg)
            }
            StorageError::CountLimit { count, max } => {
                warn!("Rejected upload of {} files (max {})", count, max);
                ApiError::payload_too_large(format!("Too many files (max {})", max))
            }
            StorageError::SizeLimit { name, max } => {
                warn!(file = ?name, "Rejected oversized upload");
                ApiError::payload_too_large(format!("File too large (max {} MB)", max / (1024 * 1024)))
            }
            StorageError::NotFound(name) => {
                warn!(file = ?name, "File not found");
                ApiError::new(StatusCode::NOT_FOUND, "File not found")
            }
            other => handle_server_error("Storage operation failed", other),
        }
    }
}

/// Helper function for bad request errors
pub fn handle_error<E: fmt::Display>(msg: &str, e: E) -> ApiError {
    error!("{}: {}", msg, e);
    ApiError::bad_request(format!("{}: {}", msg, e))
}

/// Helper function for server errors. The cause is logged, not returned.
pub fn handle_server_error<E: fmt::Display>(msg: &str, e: E) -> ApiError {
    error!("{}: {}", msg, e);
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
}

/// Helper function for not found errors
pub fn handle_not_found(msg: &str, name: &str) -> ApiError {
    warn!(file = ?name, "{}", msg);
    ApiError::new(StatusCode::NOT_FOUND, "File not found")
}

/// Map malformed JSON bodies to a JSON 400
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    handle_error("Invalid JSON body", err).into()
}

/// Map multipart failures: overflowing a limit is 413, anything else 400
pub fn multipart_error_handler(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    if matches!(err, MultipartError::Payload(PayloadError::Overflow)) {
        warn!("Rejected upload exceeding the size limit");
        return ApiError::payload_too_large(format!(
            "File too large (max {} MB)",
            storage::MAX_FILE_SIZE / (1024 * 1024)
        ))
        .into();
    }
    handle_error("Invalid upload", err).into()
}
