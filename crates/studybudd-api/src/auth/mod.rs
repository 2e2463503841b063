pub mod jwks;
pub mod middleware;
pub mod models;
pub mod verifier;

pub use middleware::{auth_middleware, AuthState};
pub use models::AuthenticatedUser;
pub use verifier::TokenVerifier;
