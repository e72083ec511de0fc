use crate::{
    auth::CurrentUser,
    dtos::assignment::{GradeRequest, SubmissionResponse, SubmitResponse},
    error::ApiResult,
    state::AppState,
    utils::multipart::UploadForm,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use database::services::submission::{
    SubmissionContent, SubmissionPayload, SubmissionService, SubmitOutcome,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart form for a submission; which part is required depends on the assignment
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmissionUpload {
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
    pub text: Option<String>,
}

/// Hand in an assignment
#[utoipa::path(
    post,
    path = "/assignments/{id}/submissions",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body(content = SubmissionUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Submission stored", body = SubmitResponse),
        (status = 200, description = "Already submitted; nothing was stored", body = SubmitResponse),
        (status = 403, description = "Caller is not a registered student"),
        (status = 404, description = "Assignment not found"),
        (status = 422, description = "Missing file or text")
    ),
    security(("jwt" = [])),
    tag = "Submissions"
)]
pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(assignment_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let mut form = UploadForm::read(multipart).await?;
    let payload = SubmissionPayload {
        file: form.take_file("file"),
        text: form.take_field("text"),
    };

    let outcome =
        SubmissionService::submit(&state.db, &state.files, &principal, assignment_id, payload)
            .await?;

    Ok(match outcome {
        SubmitOutcome::Submitted(submission) => (
            StatusCode::CREATED,
            Json(SubmitResponse {
                stored: true,
                message: "Submission received.".to_string(),
                submission: Some(submission.into()),
            }),
        ),
        SubmitOutcome::AlreadySubmitted => (
            StatusCode::OK,
            Json(SubmitResponse {
                stored: false,
                message: "You have already submitted this assignment.".to_string(),
                submission: None,
            }),
        ),
    })
}

/// List the submissions of an assignment the caller teaches
#[utoipa::path(
    get,
    path = "/assignments/{id}/submissions",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Submissions ordered by submission time", body = Vec<SubmissionResponse>),
        (status = 403, description = "Caller does not teach the assignment's course"),
        (status = 404, description = "Assignment not found")
    ),
    security(("jwt" = [])),
    tag = "Submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(assignment_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SubmissionResponse>>> {
    let submissions =
        SubmissionService::list_submissions(&state.db, &principal, assignment_id).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// Grade a submission, between zero and the assignment's points
#[utoipa::path(
    put,
    path = "/submissions/{id}/grade",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Grade saved", body = SubmissionResponse),
        (status = 403, description = "Caller does not teach the assignment's course"),
        (status = 404, description = "Submission not found"),
        (status = 422, description = "Grade out of range")
    ),
    security(("jwt" = [])),
    tag = "Submissions"
)]
pub async fn grade_submission(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<GradeRequest>,
) -> ApiResult<Json<SubmissionResponse>> {
    let submission = SubmissionService::grade(&state.db, &principal, id, request.grade).await?;
    Ok(Json(submission.into()))
}

/// Download the submitted file or text
#[utoipa::path(
    get,
    path = "/submissions/{id}/download",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submitted content", content_type = "application/octet-stream"),
        (status = 403, description = "Caller is neither the author nor the instructor"),
        (status = 404, description = "Submission not found")
    ),
    security(("jwt" = [])),
    tag = "Submissions"
)]
pub async fn download_submission(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let content = SubmissionService::download(&state.db, &state.files, &principal, id).await?;

    Ok(match content {
        SubmissionContent::File { file_name, bytes } => (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{file_name}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        SubmissionContent::Text(text) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string())],
            text,
        )
            .into_response(),
    })
}
