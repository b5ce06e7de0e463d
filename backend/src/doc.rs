//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every handler in the inbound HTTP layer (session, files,
//!   analysis, health)
//! - **Schemas**: request/response DTOs plus the error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that document domain types
//!   without coupling them to utoipa
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is served by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::files_dto::{
    AnalysisAcceptedResponse, AnalysisResponse, MetricsResponse, RecordResponse,
    RecordWithAnalysisResponse, UploadForm,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{CurrentUserResponse, LoginRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Finlens API",
        description = "Upload financial documents and request AI analyses of their contents."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::files::upload_file,
        crate::inbound::http::files::list_files,
        crate::inbound::http::files::get_file,
        crate::inbound::http::files::delete_file,
        crate::inbound::http::analysis::analyze_file,
        crate::inbound::http::analysis::get_analysis,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        CurrentUserResponse,
        UploadForm,
        RecordResponse,
        RecordWithAnalysisResponse,
        MetricsResponse,
        AnalysisResponse,
        AnalysisAcceptedResponse,
    )),
    tags(
        (name = "users", description = "Session login and identity"),
        (name = "files", description = "Financial document records"),
        (name = "analysis", description = "AI analysis of uploaded records"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use crate::test_support::openapi::{get_property, unwrap_object_schema};
    use rstest::rstest;
    use utoipa::OpenApi;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");
        let object = unwrap_object_schema(error_schema, ERROR_SCHEMA_NAME);

        get_property(object, "code");
        get_property(object, "message");
        get_property(object, "traceId");
    }

    #[rstest]
    #[case("AnalysisResponse", "healthScore")]
    #[case("AnalysisResponse", "aiNarrative")]
    #[case("AnalysisAcceptedResponse", "recordId")]
    #[case("RecordResponse", "uploadDate")]
    #[case("MetricsResponse", "netProfit")]
    fn dto_schemas_use_camel_case(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let object = unwrap_object_schema(schemas.get(schema).expect("schema registered"), schema);
        get_property(object, field);
    }

    #[rstest]
    #[case("/api/login")]
    #[case("/api/auth/user")]
    #[case("/api/files")]
    #[case("/api/files/{id}")]
    #[case("/api/files/{id}/analyze")]
    #[case("/api/files/{id}/analysis")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
