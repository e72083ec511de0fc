use crate::{
    auth::CurrentUser,
    dtos::profile::{ProfileRequest, ProfileResponse},
    error::{ApiError, ApiResult},
    state::AppState,
    utils::multipart::UploadForm,
};
use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use database::{error::ServiceError, services::profile::ProfileService};
use serde::Deserialize;
use utoipa::ToSchema;

/// Multipart form carrying a profile picture
#[derive(Debug, Deserialize, ToSchema)]
pub struct PictureUpload {
    #[schema(value_type = String, format = Binary)]
    pub picture: Vec<u8>,
}

/// The caller's profile, created empty on first access
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized - invalid or missing JWT")
    ),
    security(("jwt" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = ProfileService::get_or_create(&state.db, &principal.user_id).await?;
    Ok(Json(profile.into()))
}

/// Update name, contact and link fields
#[utoipa::path(
    put,
    path = "/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 422, description = "Invalid profile fields")
    ),
    security(("jwt" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<ProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile =
        ProfileService::update_profile(&state.db, &principal.user_id, request.into()).await?;
    Ok(Json(profile.into()))
}

/// Replace the profile picture
#[utoipa::path(
    post,
    path = "/profile/picture",
    request_body(content = PictureUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Picture stored", body = ProfileResponse),
        (status = 422, description = "Missing, oversized or unsupported picture")
    ),
    security(("jwt" = [])),
    tag = "Profile"
)]
pub async fn upload_picture(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    multipart: Multipart,
) -> ApiResult<Json<ProfileResponse>> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.take_file("picture").ok_or_else(|| {
        ApiError::from(ServiceError::validation(
            "picture",
            "Please select a file to upload.",
        ))
    })?;

    let profile =
        ProfileService::set_picture(&state.db, &state.files, &principal.user_id, upload).await?;
    Ok(Json(profile.into()))
}

/// Remove the profile picture
#[utoipa::path(
    delete,
    path = "/profile/picture",
    responses(
        (status = 200, description = "Picture removed", body = ProfileResponse)
    ),
    security(("jwt" = [])),
    tag = "Profile"
)]
pub async fn remove_picture(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Json<ProfileResponse>> {
    let profile =
        ProfileService::remove_picture(&state.db, &state.files, &principal.user_id).await?;
    Ok(Json(profile.into()))
}

/// The stored profile picture
#[utoipa::path(
    get,
    path = "/profile/picture",
    responses(
        (status = 200, description = "Picture bytes", content_type = "image/*"),
        (status = 404, description = "No profile picture")
    ),
    security(("jwt" = [])),
    tag = "Profile"
)]
pub async fn get_picture(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Response> {
    let (bytes, content_type) = ProfileService::picture(&state.db, &principal.user_id).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
