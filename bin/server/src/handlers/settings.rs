use crate::handlers::error::ApiError;
use crate::handlers::ApiResult;
use crate::state::AppState;
use actix_web::{get, put, web, HttpResponse};
use common::settings::{describe_retention, parse_minutes, MAX_CLEANUP_AFTER_MINUTES};
use common::{SettingsPayload, SettingsUpdateRequest};
use tracing::info;

/// Current cleanup settings
#[get("/api/settings")]
pub async fn get_settings(state: web::Data<AppState>) -> HttpResponse {
    let settings = state.settings.load().await;
    HttpResponse::Ok().json(SettingsPayload {
        cleanup_after_minutes: settings.cleanup_after_minutes,
    })
}

/// Replace the cleanup retention; the sweeper picks it up on its next tick
#[put("/api/settings")]
pub async fn update_settings(
    body: web::Json<SettingsUpdateRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let minutes = parse_minutes(&body.cleanup_after_minutes).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Invalid value (0-{} minutes)",
            MAX_CLEANUP_AFTER_MINUTES
        ))
    })?;

    let settings = state.settings.update(minutes).await?;

    info!(
        cleanup_after_minutes = settings.cleanup_after_minutes,
        "PUT /api/settings - Cleanup set to {}",
        describe_retention(settings.cleanup_after_minutes)
    );

    Ok(HttpResponse::Ok().json(SettingsPayload {
        cleanup_after_minutes: settings.cleanup_after_minutes,
    }))
}
