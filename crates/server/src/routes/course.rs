use crate::{
    auth::CurrentUser,
    dtos::course::{CourseQueryParams, CourseRequest, CourseResponse, FilterOptionsResponse},
    error::ApiResult,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::course::CourseService;
use uuid::Uuid;

/// Search the course catalog
#[utoipa::path(
    get,
    path = "/catalog",
    params(CourseQueryParams),
    responses(
        (status = 200, description = "Matching courses ordered by department and number", body = Vec<CourseResponse>),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Catalog"
)]
pub async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseQueryParams>,
) -> ApiResult<Json<Vec<CourseResponse>>> {
    let courses = CourseService::search(&state.db, &params.into()).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

/// Get a specific course by ID
#[utoipa::path(
    get,
    path = "/catalog/{id}",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Catalog"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CourseResponse>> {
    let course = CourseService::find_course(&state.db, id).await?;
    Ok(Json(course.into()))
}

/// Get the departments and credit-hour values present in the catalog
#[utoipa::path(
    get,
    path = "/catalog/filters",
    responses(
        (status = 200, description = "Filter options retrieved successfully", body = FilterOptionsResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Catalog"
)]
pub async fn get_course_filters(
    State(state): State<AppState>,
) -> ApiResult<Json<FilterOptionsResponse>> {
    let options = CourseService::filter_options(&state.db).await?;
    Ok(Json(options.into()))
}

/// Create a course taught by the caller
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 403, description = "Caller is not an instructor"),
        (status = 422, description = "Invalid course fields")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<CourseRequest>,
) -> ApiResult<(StatusCode, Json<CourseResponse>)> {
    let course = CourseService::create_course(&state.db, &principal, request.into()).await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}

/// Update a course the caller teaches
#[utoipa::path(
    put,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 403, description = "Caller does not teach this course"),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Invalid course fields")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CourseRequest>,
) -> ApiResult<Json<CourseResponse>> {
    let course = CourseService::update_course(&state.db, &principal, id, request.into()).await?;
    Ok(Json(course.into()))
}

/// Delete a course with its registrations, assignments and submissions
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Caller does not teach this course"),
        (status = 404, description = "Course not found")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    CourseService::delete_course(&state.db, &state.files, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Registered courses for a student, taught courses for an instructor
#[utoipa::path(
    get,
    path = "/me/courses",
    responses(
        (status = 200, description = "The caller's courses", body = Vec<CourseResponse>),
        (status = 401, description = "Unauthorized - invalid or missing JWT")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn my_courses(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<Vec<CourseResponse>>> {
    let courses = CourseService::courses_for(&state.db, &principal).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}
