//! OpenAPI 3.0 documentation assembly
//!
//! Aggregates handler path annotations and domain schemas into a single
//! document served by Swagger UI at `/api-docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jobs API",
        version = "0.1.0",
        description = "Job board API: register, log in, and manage your own job applications",
        license(name = "MIT"),
        contact(name = "Jobboard Team")
    ),
    tags(
        (name = "System", description = "Landing page, health and readiness"),
        (name = "Auth", description = "Registration and login"),
        (name = "Jobs", description = "Jobs owned by the authenticated user"),
    ),
    security(
        ("bearer_jwt" = [])
    ),
    components(
        schemas(
            // Shared
            crate::api::MessageResponse,
            crate::error::ErrorResponse,
            crate::domain::StringUuid,

            // Users
            crate::domain::UserProfile,
            crate::domain::RegisterInput,
            crate::domain::LoginInput,
            crate::api::auth::AuthResponse,

            // Jobs
            crate::domain::Job,
            crate::domain::JobStatus,
            crate::domain::JobSort,
            crate::domain::CreateJobInput,
            crate::domain::UpdateJobInput,
            crate::api::job::JobResponse,
            crate::api::job::JobListResponse,

            crate::api::health::HealthResponse,
        ),
    ),
    paths(
        crate::api::home::home,
        crate::api::health::health,
        crate::api::health::ready,

        crate::api::auth::register,
        crate::api::auth::login,

        crate::api::job::list,
        crate::api::job::create,
        crate::api::job::get,
        crate::api::job::update,
        crate::api::job::delete,
    ),
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The generated document plus the bearer JWT security scheme
    pub fn build() -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        if let Some(c) = doc.components.as_mut() {
            c.security_schemes.insert(
                "bearer_jwt".to_string(),
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
        doc
    }
}
