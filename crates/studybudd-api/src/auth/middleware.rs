use crate::auth::verifier::TokenVerifier;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use studybudd_core::AppError;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: TokenVerifier,
}

impl AuthState {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }
}

fn log_authentication_attempt(user_id: Option<&uuid::Uuid>, success: bool, reason: Option<&str>) {
    if success {
        tracing::debug!(
            user_id = ?user_id,
            success,
            "Authentication attempt"
        );
    } else {
        tracing::info!(
            success,
            reason = reason.unwrap_or("unknown"),
            "Authentication attempt"
        );
    }
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            log_authentication_attempt(None, false, Some("Missing authorization header"));
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim().to_string(),
        _ => {
            log_authentication_attempt(None, false, Some("Invalid authorization header format"));
            return HttpAppError(AppError::Unauthorized(
                "Invalid authorization header format. Expected: Bearer <token>".to_string(),
            ))
            .into_response();
        }
    };

    match auth_state.verifier.verify(&token).await {
        Ok(user) => {
            log_authentication_attempt(Some(&user.user_id), true, None);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            log_authentication_attempt(None, false, Some(&e.to_string()));
            HttpAppError(e).into_response()
        }
    }
}
