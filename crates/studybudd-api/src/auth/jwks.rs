//! JWKS (JSON Web Key Set) retrieval and key conversion
//!
//! Key sets are fetched once per JWKS URL and kept for the lifetime of the
//! process. The cache is shared by every verifier instance. A failed fetch is
//! an upstream error, not a rejected token, and is not cached.

use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use studybudd_core::AppError;
use tokio::sync::RwLock;

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    #[serde(rename = "alg")]
    pub algorithm: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>, // RSA
    #[serde(rename = "e")]
    pub exponent: Option<String>, // RSA
    #[serde(rename = "x")]
    pub x_coordinate: Option<String>, // EC
    #[serde(rename = "y")]
    pub y_coordinate: Option<String>, // EC
    #[serde(rename = "crv")]
    pub curve: Option<String>, // EC
}

impl Jwks {
    /// Key matching `kid`, or the first key when the token names none.
    pub fn find_key(&self, kid: Option<&str>) -> Result<&Jwk, AppError> {
        match kid {
            Some(kid) => self
                .keys
                .iter()
                .find(|k| k.key_id.as_deref() == Some(kid))
                .ok_or_else(|| {
                    AppError::Unauthorized(format!(
                        "Invalid token: signing key {} not found in JWKS",
                        kid
                    ))
                }),
            None => self
                .keys
                .first()
                .ok_or_else(|| AppError::Unauthorized("No keys found in JWKS".to_string())),
        }
    }
}

static JWKS_CACHE: LazyLock<RwLock<HashMap<String, Arc<Jwks>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Cached key set for `jwks_url`, fetching it on first use.
///
/// Two concurrent cold lookups may both fetch; the first stored set wins and
/// both callers get it.
pub async fn get_jwks(jwks_url: &str, timeout: Duration) -> Result<Arc<Jwks>, AppError> {
    if let Some(jwks) = JWKS_CACHE.read().await.get(jwks_url) {
        return Ok(jwks.clone());
    }

    let fetched = Arc::new(fetch_jwks(jwks_url, timeout).await?);
    tracing::info!(
        jwks_url = %jwks_url,
        key_count = fetched.keys.len(),
        "JWKS fetched and cached"
    );

    let mut cache = JWKS_CACHE.write().await;
    Ok(cache
        .entry(jwks_url.to_string())
        .or_insert(fetched)
        .clone())
}

async fn fetch_jwks(jwks_url: &str, timeout: Duration) -> Result<Jwks, AppError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

    let response = client.get(jwks_url).send().await.map_err(|e| {
        tracing::warn!(error = %e, jwks_url = %jwks_url, "JWKS request failed");
        AppError::Upstream(format!("Failed to fetch JWKS: {}", e))
    })?;

    if !response.status().is_success() {
        return Err(AppError::Upstream(format!(
            "Failed to fetch JWKS: endpoint returned {}",
            response.status()
        )));
    }

    response
        .json::<Jwks>()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to parse JWKS: {}", e)))
}

/// Convert a JWK to a `DecodingKey`
pub fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
    match jwk.key_type.as_str() {
        "RSA" => {
            let n = jwk
                .modulus
                .as_ref()
                .ok_or_else(|| AppError::Unauthorized("RSA key missing modulus".to_string()))?;
            let e = jwk
                .exponent
                .as_ref()
                .ok_or_else(|| AppError::Unauthorized("RSA key missing exponent".to_string()))?;

            DecodingKey::from_rsa_components(n, e)
                .map_err(|e| AppError::Unauthorized(format!("Failed to create RSA key: {}", e)))
        }
        "EC" => {
            let x = jwk.x_coordinate.as_ref().ok_or_else(|| {
                AppError::Unauthorized("EC key missing x coordinate".to_string())
            })?;
            let y = jwk.y_coordinate.as_ref().ok_or_else(|| {
                AppError::Unauthorized("EC key missing y coordinate".to_string())
            })?;
            let curve = jwk
                .curve
                .as_deref()
                .ok_or_else(|| AppError::Unauthorized("EC key missing curve".to_string()))?;

            if curve != "P-256" && curve != "P-384" {
                return Err(AppError::Unauthorized(format!(
                    "Unsupported EC curve: {}",
                    curve
                )));
            }

            DecodingKey::from_ec_components(x, y)
                .map_err(|e| AppError::Unauthorized(format!("Failed to create EC key: {}", e)))
        }
        _ => Err(AppError::Unauthorized(format!(
            "Unsupported key type: {}",
            jwk.key_type
        ))),
    }
}
