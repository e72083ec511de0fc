use crate::auth::CurrentUser;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    /// "Student" or "Instructor"
    pub role: String,
}

/// Returns the identity and role carried by the caller's JWT
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Successfully authenticated", body = MeResponse),
        (status = 401, description = "Unauthorized - invalid or missing JWT"),
        (status = 403, description = "Token carries no recognized role")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "Authentication"
)]
pub async fn me(CurrentUser(principal): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        role: principal.role.to_string(),
        user_id: principal.user_id,
        email: principal.email,
    })
}
