use actix_web::{get, HttpResponse};
use common::HealthResponse;

/// Liveness check used by scripts waiting for the server to come up
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}
