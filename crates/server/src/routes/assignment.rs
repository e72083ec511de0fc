use crate::{
    auth::CurrentUser,
    dtos::assignment::{AssignmentRequest, AssignmentResponse},
    error::ApiResult,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::assignment::AssignmentService;
use uuid::Uuid;

/// List a course's assignments ordered by due date
#[utoipa::path(
    get,
    path = "/courses/{id}/assignments",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Assignments of the course", body = Vec<AssignmentResponse>),
        (status = 403, description = "Caller neither teaches nor is registered in the course"),
        (status = 404, description = "Course not found")
    ),
    security(("jwt" = [])),
    tag = "Assignments"
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = AssignmentService::list_for_course(&state.db, &principal, course_id).await?;
    Ok(Json(assignments.into_iter().map(Into::into).collect()))
}

/// Create an assignment in a course the caller teaches
#[utoipa::path(
    post,
    path = "/courses/{id}/assignments",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = AssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 403, description = "Caller does not teach this course"),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Invalid assignment fields")
    ),
    security(("jwt" = [])),
    tag = "Assignments"
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(course_id): Path<Uuid>,
    Json(request): Json<AssignmentRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentResponse>)> {
    let assignment =
        AssignmentService::create_assignment(&state.db, &principal, course_id, request.into())
            .await?;
    Ok((StatusCode::CREATED, Json(assignment.into())))
}

/// Edit an assignment; it always stays in its course
#[utoipa::path(
    put,
    path = "/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = AssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentResponse),
        (status = 403, description = "Caller does not teach the assignment's course"),
        (status = 404, description = "Assignment not found"),
        (status = 422, description = "Invalid assignment fields")
    ),
    security(("jwt" = [])),
    tag = "Assignments"
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignmentRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    let assignment =
        AssignmentService::update_assignment(&state.db, &principal, id, request.into()).await?;
    Ok(Json(assignment.into()))
}

/// Delete an assignment and its submissions
#[utoipa::path(
    delete,
    path = "/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 403, description = "Caller does not teach the assignment's course"),
        (status = 404, description = "Assignment not found")
    ),
    security(("jwt" = [])),
    tag = "Assignments"
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    AssignmentService::delete_assignment(&state.db, &state.files, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
