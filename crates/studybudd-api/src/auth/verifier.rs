//! Bearer token verification
//!
//! Asymmetric tokens (ES256/ES384/RS256/RS384/RS512) are checked against the
//! identity provider's JWKS; HS256 tokens against the shared secret. Every
//! accepted token must carry `aud = "authenticated"`, an unexpired `exp`, and
//! a UUID `sub`.

use crate::auth::jwks;
use crate::auth::models::{AuthenticatedUser, SupabaseClaims};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::time::Duration;
use studybudd_core::{AppError, Config};
use uuid::Uuid;

pub const TOKEN_AUDIENCE: &str = "authenticated";
pub const DEV_USER_EMAIL: &str = "dev@localhost";

#[derive(Clone)]
pub struct TokenVerifier {
    jwks_url: Option<String>,
    jwt_secret: Option<String>,
    dev_user_id: Option<Uuid>,
    fetch_timeout: Duration,
}

impl TokenVerifier {
    pub fn new(
        jwks_url: Option<String>,
        jwt_secret: Option<String>,
        dev_user_id: Option<Uuid>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            jwks_url,
            jwt_secret,
            dev_user_id,
            fetch_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let verifier = Self::new(
            config.jwks_url(),
            config.auth.jwt_secret.clone(),
            config.dev_bypass_user(),
            Duration::from_secs(config.auth.jwks_fetch_timeout_secs),
        );
        if let Some(user_id) = verifier.dev_user_id {
            tracing::warn!(user_id = %user_id, "Development auth bypass enabled, tokens are not verified");
        }
        verifier
    }

    /// Verify `token` and return the caller's identity.
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        if let Some(user_id) = self.dev_user_id {
            return Ok(AuthenticatedUser {
                user_id,
                email: Some(DEV_USER_EMAIL.to_string()),
            });
        }

        let header = decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token format: {}", e)))?;
        let algorithm = header.alg;

        let key = match algorithm {
            Algorithm::ES256
            | Algorithm::ES384
            | Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512 => {
                let jwks_url = self.jwks_url.as_deref().ok_or_else(|| {
                    AppError::Configuration(
                        "JWKS not configured. Set SUPABASE_URL in environment.".to_string(),
                    )
                })?;
                let key_set = jwks::get_jwks(jwks_url, self.fetch_timeout).await?;
                let jwk = key_set.find_key(header.kid.as_deref())?;
                jwks::jwk_to_decoding_key(jwk)?
            }
            Algorithm::HS256 => {
                let secret = self.jwt_secret.as_deref().ok_or_else(|| {
                    AppError::Configuration(
                        "Supabase JWT secret not configured for HS256".to_string(),
                    )
                })?;
                DecodingKey::from_secret(secret.as_bytes())
            }
            other => {
                return Err(AppError::Unauthorized(format!(
                    "Unsupported JWT algorithm: {:?}",
                    other
                )))
            }
        };

        let claims = decode_claims(token, &key, algorithm)?;
        user_from_claims(claims)
    }
}

fn validation_for(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "aud"]);
    validation
}

fn decode_claims(
    token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
) -> Result<SupabaseClaims, AppError> {
    decode::<SupabaseClaims>(token, key, &validation_for(algorithm))
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            if matches!(e.kind(), ErrorKind::ExpiredSignature) || expired_ignoring_signature(token)
            {
                AppError::Unauthorized("Token has expired".to_string())
            } else {
                AppError::Unauthorized(format!("Invalid token: {}", e))
            }
        })
}

/// Whether the token's `exp` has passed, without trusting anything else in it.
/// Only used to pick the rejection message for a token that already failed.
fn expired_ignoring_signature(token: &str) -> bool {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    matches!(
        decode::<serde_json::Value>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| e.into_kind()),
        Err(ErrorKind::ExpiredSignature)
    )
}

fn user_from_claims(claims: SupabaseClaims) -> Result<AuthenticatedUser, AppError> {
    let sub = claims
        .sub
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid token: missing user ID".to_string()))?;

    let user_id = Uuid::parse_str(&sub).map_err(|_| {
        AppError::Unauthorized("Invalid token: user ID is not a valid UUID".to_string())
    })?;

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    fn hs256_verifier() -> TokenVerifier {
        TokenVerifier::new(None, Some(SECRET.to_string()), None, Duration::from_secs(1))
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn sign(alg: Algorithm, claims: serde_json::Value) -> String {
        encode(
            &Header::new(alg),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn unauthorized_message(result: Result<AuthenticatedUser, AppError>) -> String {
        match result {
            Err(AppError::Unauthorized(msg)) => msg,
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hs256_valid_token() {
        let user = Uuid::new_v4();
        let token = sign(
            Algorithm::HS256,
            json!({"sub": user, "aud": "authenticated", "exp": now() + 3600, "email": "a@b.c"}),
        );

        let verified = hs256_verifier().verify(&token).await.unwrap();
        assert_eq!(verified.user_id, user);
        assert_eq!(verified.email.as_deref(), Some("a@b.c"));
    }

    #[tokio::test]
    async fn test_expired_token_has_distinct_message() {
        let token = sign(
            Algorithm::HS256,
            json!({"sub": Uuid::new_v4(), "aud": "authenticated", "exp": now() - 10}),
        );
        let msg = unauthorized_message(hs256_verifier().verify(&token).await);
        assert_eq!(msg, "Token has expired");
    }

    #[tokio::test]
    async fn test_expired_token_with_bad_signature_reports_expiry() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({"sub": Uuid::new_v4(), "aud": "authenticated", "exp": now() - 10}),
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();
        let msg = unauthorized_message(hs256_verifier().verify(&token).await);
        assert_eq!(msg, "Token has expired");
    }

    #[tokio::test]
    async fn test_wrong_audience_rejected() {
        let token = sign(
            Algorithm::HS256,
            json!({"sub": Uuid::new_v4(), "aud": "anon", "exp": now() + 3600}),
        );
        let msg = unauthorized_message(hs256_verifier().verify(&token).await);
        assert!(msg.starts_with("Invalid token:"), "{}", msg);
    }

    #[tokio::test]
    async fn test_missing_audience_rejected() {
        let token = sign(
            Algorithm::HS256,
            json!({"sub": Uuid::new_v4(), "exp": now() + 3600}),
        );
        let msg = unauthorized_message(hs256_verifier().verify(&token).await);
        assert!(msg.starts_with("Invalid token:"), "{}", msg);
    }

    #[tokio::test]
    async fn test_token_without_expiry_rejected() {
        let token = sign(
            Algorithm::HS256,
            json!({"sub": Uuid::new_v4(), "aud": "authenticated"}),
        );
        let msg = unauthorized_message(hs256_verifier().verify(&token).await);
        assert!(msg.starts_with("Invalid token:"), "{}", msg);
    }

    #[tokio::test]
    async fn test_missing_or_invalid_subject() {
        let token = sign(
            Algorithm::HS256,
            json!({"aud": "authenticated", "exp": now() + 3600}),
        );
        assert_eq!(
            unauthorized_message(hs256_verifier().verify(&token).await),
            "Invalid token: missing user ID"
        );

        let token = sign(
            Algorithm::HS256,
            json!({"sub": "", "aud": "authenticated", "exp": now() + 3600}),
        );
        assert_eq!(
            unauthorized_message(hs256_verifier().verify(&token).await),
            "Invalid token: missing user ID"
        );

        let token = sign(
            Algorithm::HS256,
            json!({"sub": "user-42", "aud": "authenticated", "exp": now() + 3600}),
        );
        assert!(hs256_verifier().verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_hs256_without_secret_is_configuration_error() {
        let verifier = TokenVerifier::new(None, None, None, Duration::from_secs(1));
        let token = sign(
            Algorithm::HS256,
            json!({"sub": Uuid::new_v4(), "aud": "authenticated", "exp": now() + 3600}),
        );
        assert!(matches!(
            verifier.verify(&token).await,
            Err(AppError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_unsupported_algorithms() {
        let claims = json!({"sub": Uuid::new_v4(), "aud": "authenticated", "exp": now() + 3600});
        let mut tokens = vec![
            sign(Algorithm::HS384, claims.clone()),
            sign(Algorithm::HS512, claims),
        ];
        // {"alg":"PS256","typ":"JWT"}, signature never checked
        tokens.push("eyJhbGciOiJQUzI1NiIsInR5cCI6IkpXVCJ9.e30.c2ln".to_string());

        for token in tokens {
            let msg = unauthorized_message(hs256_verifier().verify(&token).await);
            assert!(msg.starts_with("Unsupported JWT algorithm"), "{}", msg);
        }
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid_format() {
        let msg = unauthorized_message(hs256_verifier().verify("not-a-jwt").await);
        assert!(msg.starts_with("Invalid token format"), "{}", msg);
    }

    #[tokio::test]
    async fn test_dev_bypass_returns_fixed_identity() {
        let dev = Uuid::new_v4();
        let verifier = TokenVerifier::new(None, None, Some(dev), Duration::from_secs(1));
        let user = verifier.verify("anything").await.unwrap();
        assert_eq!(user.user_id, dev);
        assert_eq!(user.email.as_deref(), Some("dev@localhost"));
    }
}
