//! StudyBudd API Library
//!
//! HTTP handlers, bearer-token authentication, the document workflow, and
//! application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;

pub mod auth;
pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{DocumentService, UploadRequest};
pub use state::AppState;
