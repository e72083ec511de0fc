pub mod assignment;
pub mod auth;
pub mod billing;
pub mod course;
pub mod health;
pub mod profile;
pub mod registration;
pub mod submission;

use crate::{doc::ApiDoc, state::AppState};
use axum::{Router, extract::DefaultBodyLimit};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body; submissions are the biggest uploads
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Routes reachable without a token
pub fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health::health))
        .routes(routes!(course::search_courses))
        .routes(routes!(course::get_course_filters))
        .routes(routes!(course::get_course))
        // Authenticated by its signature instead of a JWT
        .routes(routes!(billing::payment_webhook))
}

/// Routes that need the authenticated caller's claims
pub fn protected_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::me))
        .routes(routes!(course::create_course))
        .routes(routes!(course::update_course, course::delete_course))
        .routes(routes!(course::my_courses))
        .routes(routes!(registration::toggle_registration))
        .routes(routes!(
            assignment::list_assignments,
            assignment::create_assignment
        ))
        .routes(routes!(
            assignment::update_assignment,
            assignment::delete_assignment
        ))
        .routes(routes!(submission::submit, submission::list_submissions))
        .routes(routes!(submission::grade_submission))
        .routes(routes!(submission::download_submission))
        .routes(routes!(billing::account))
        .routes(routes!(billing::create_checkout))
        .routes(routes!(billing::checkout_success))
        .routes(routes!(billing::checkout_cancel))
        .routes(routes!(profile::get_profile, profile::update_profile))
        .routes(routes!(
            profile::get_picture,
            profile::upload_picture,
            profile::remove_picture
        ))
}

/// Joins both route sets with the API docs. The caller layers authentication
/// onto `protected` before handing it over.
pub fn app(
    public: OpenApiRouter<AppState>,
    protected: OpenApiRouter<AppState>,
    state: AppState,
) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(public)
        .merge(protected)
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .with_state(state)
}
