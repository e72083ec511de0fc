use crate::{
    auth::CurrentUser, dtos::course::RegistrationResponse, error::ApiResult, state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use database::services::{course::CourseService, registration::RegistrationService};
use uuid::Uuid;

/// Add the calling student to a course, or drop them if already registered
#[utoipa::path(
    post,
    path = "/courses/{id}/registration",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Registration toggled", body = RegistrationResponse),
        (status = 403, description = "Caller is not a student"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course is full")
    ),
    security(("jwt" = [])),
    tag = "Registration"
)]
pub async fn toggle_registration(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RegistrationResponse>> {
    let change = RegistrationService::toggle(&state.db, &principal, id).await?;
    let course = CourseService::find_course(&state.db, id).await?;
    Ok(Json(RegistrationResponse::new(&course, change)))
}
