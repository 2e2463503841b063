//! Document route group.

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn document_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/documents/upload", API_PREFIX),
            post(handlers::document_upload::upload_document),
        )
        .route(
            &format!("{}/documents", API_PREFIX),
            get(handlers::document_get::list_documents),
        )
        .route(
            &format!("{}/documents/{{id}}", API_PREFIX),
            get(handlers::document_get::get_document)
                .delete(handlers::document_delete::delete_document),
        )
        .route(
            &format!("{}/documents/{{id}}/url", API_PREFIX),
            get(handlers::document_get::get_document_url),
        )
        .with_state(state)
}
