//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use studybudd_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StudyBudd API",
        version = "0.1.0",
        description = "Document storage for StudyBudd: upload PDF and image study material, list, fetch and delete your own documents. Every document route requires a Supabase access token."
    ),
    paths(
        handlers::document_upload::upload_document,
        handlers::document_get::list_documents,
        handlers::document_get::get_document,
        handlers::document_get::get_document_url,
        handlers::document_delete::delete_document,
    ),
    components(schemas(
        models::DocumentResponse,
        models::DocumentUploadResponse,
        models::DocumentListResponse,
        models::DocumentUrlResponse,
        error::ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "documents", description = "Study document upload and retrieval")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_document_routes() {
        let spec = get_openapi_spec();
        for path in [
            "/api/documents/upload",
            "/api/documents",
            "/api/documents/{id}",
            "/api/documents/{id}/url",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(spec
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
