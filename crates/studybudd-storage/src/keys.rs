//! Storage path generation.
//!
//! Paths have the form `{owner_id}/{uuid}.{ext}`. All backends go through
//! these helpers so paths stay consistent.

use uuid::Uuid;

const FALLBACK_EXTENSION: &str = "bin";

/// Longest extension kept verbatim. Generated object names must fit the
/// 255-character `filename` column.
pub const MAX_EXTENSION_LEN: usize = 16;

/// Extension of an uploaded file name: the text after the last `.`.
///
/// Names without a usable extension get `bin`. Anything that is not plain
/// ASCII alphanumeric, or longer than [`MAX_EXTENSION_LEN`], is treated as
/// unusable so it cannot introduce extra path segments.
pub fn file_extension(original_name: &str) -> &str {
    match original_name.rsplit_once('.') {
        Some((_, ext))
            if !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext
        }
        _ => FALLBACK_EXTENSION,
    }
}

/// Fresh storage path for a blob owned by `owner`.
pub fn generate_storage_path(owner: Uuid, original_name: &str) -> String {
    format!(
        "{}/{}.{}",
        owner,
        Uuid::new_v4(),
        file_extension(original_name)
    )
}

/// Reject paths that could escape the bucket or owner prefix.
pub fn validate_storage_path(storage_path: &str) -> bool {
    !storage_path.is_empty()
        && !storage_path.starts_with('/')
        && !storage_path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
}
