use crate::{error::ApiResult, state::AppState};
use axum::{extract::State, http::StatusCode};
use sea_orm::ConnectionTrait;

/// Returns "OK" when the service can reach its database
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", content_type = "text/plain", body = String),
        (status = 500, description = "Database unreachable")
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> ApiResult<(StatusCode, &'static str)> {
    state.db.execute_unprepared("SELECT 1").await?;
    Ok((StatusCode::OK, "OK"))
}
