pub mod document;

pub use document::{
    Document, DocumentKind, DocumentListResponse, DocumentResponse, DocumentUploadResponse,
    DocumentUrlResponse, NewDocument,
};
