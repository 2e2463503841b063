pub mod document_delete;
pub mod document_get;
pub mod document_upload;
