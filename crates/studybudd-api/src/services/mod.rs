pub mod documents;

pub use documents::{DocumentService, UploadRequest};
