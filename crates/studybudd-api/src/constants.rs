/// Prefix under which every document route is mounted
pub const API_PREFIX: &str = "/api";

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Readiness probe budget for the database ping
pub const READINESS_TIMEOUT_SECS: u64 = 5;

/// Request headroom above the upload limit for multipart framing
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// In-flight request cap for the whole router
pub const MAX_CONCURRENT_REQUESTS: usize = 512;
