use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation. Paths are collected from the routers in `routes`.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Authentication related endpoints"),
        (name = "Catalog", description = "Public course catalog"),
        (name = "Courses", description = "Instructor course management"),
        (name = "Registration", description = "Student add/drop"),
        (name = "Assignments", description = "Assignment lifecycle"),
        (name = "Submissions", description = "Hand-ins, grading and downloads"),
        (name = "Billing", description = "Tuition balance and payments"),
        (name = "Profile", description = "User profiles and pictures"),
    ),
    info(
        title = "LMS API",
        version = "1.0.0",
        description = "Learning management system API",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
