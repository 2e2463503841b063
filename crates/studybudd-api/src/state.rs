//! Application state shared by every handler.

use crate::services::DocumentService;

#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
}

impl AppState {
    pub fn new(documents: DocumentService) -> Self {
        Self { documents }
    }
}
