//! Configuration module
//!
//! Settings are read from the process environment (with `.env` loaded through
//! `dotenvy`) into [`Config`]. `Config::from_lookup` takes any key lookup so
//! parsing can be exercised without touching the real environment.

use std::env;

use uuid::Uuid;

use crate::storage_types::StorageBackend;

const APP_NAME: &str = "StudyBudd API";
const SERVER_PORT: u16 = 8000;
const CORS_ORIGINS: &str = "http://localhost:3000";
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const STORAGE_BUCKET: &str = "documents";
const STORAGE_REGION: &str = "us-east-1";
const MAX_UPLOAD_SIZE_MB: usize = 10;
const JWKS_FETCH_TIMEOUT_SECS: u64 = 10;

/// Server and runtime settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub app_name: String,
    pub environment: String,
    pub debug: bool,
    /// Fixed identity for the development auth bypass
    pub dev_user_id: Option<Uuid>,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Identity provider settings used by the token verifier
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub supabase_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwks_fetch_timeout_secs: u64,
}

/// Blob store settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Set when the bucket lives in Supabase Storage; drives public URLs
    pub supabase_url: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub max_upload_size_mb: usize,
}

impl StorageConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// In-memory store with the default limits, mainly for tests.
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            bucket: STORAGE_BUCKET.to_string(),
            region: STORAGE_REGION.to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            supabase_url: None,
            local_storage_path: None,
            local_storage_base_url: None,
            max_upload_size_mb: MAX_UPLOAD_SIZE_MB,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub database_url: String,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let debug = var("DEBUG")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let dev_user_id = var("DEV_USER_ID")
            .map(|v| {
                Uuid::parse_str(v.trim())
                    .map_err(|_| anyhow::anyhow!("DEV_USER_ID must be a valid UUID"))
            })
            .transpose()?;

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            app_name: var("APP_NAME").unwrap_or_else(|| APP_NAME.to_string()),
            environment,
            debug,
            dev_user_id,
            server_port: var("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: var("DB_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let supabase_url = var("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string());

        let auth = AuthConfig {
            supabase_url: supabase_url.clone(),
            jwt_secret: var("SUPABASE_JWT_SECRET"),
            jwks_fetch_timeout_secs: var("JWKS_FETCH_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(JWKS_FETCH_TIMEOUT_SECS),
        };

        let backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::default(),
        };

        // Supabase Storage speaks the S3 protocol under /storage/v1/s3
        let endpoint = var("S3_ENDPOINT")
            .map(|e| e.trim_end_matches('/').to_string())
            .or_else(|| {
                supabase_url
                    .as_ref()
                    .map(|url| format!("{}/storage/v1/s3", url))
            });

        let storage = StorageConfig {
            backend,
            bucket: var("SUPABASE_STORAGE_BUCKET")
                .or_else(|| var("S3_BUCKET"))
                .unwrap_or_else(|| STORAGE_BUCKET.to_string()),
            region: var("S3_REGION")
                .or_else(|| var("AWS_REGION"))
                .unwrap_or_else(|| STORAGE_REGION.to_string()),
            endpoint,
            access_key_id: var("S3_ACCESS_KEY_ID").or_else(|| var("AWS_ACCESS_KEY_ID")),
            secret_access_key: var("S3_SECRET_ACCESS_KEY")
                .or_else(|| var("AWS_SECRET_ACCESS_KEY"))
                .or_else(|| var("SUPABASE_SERVICE_KEY")),
            supabase_url,
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string()),
            max_upload_size_mb: var("MAX_UPLOAD_SIZE_MB")
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_UPLOAD_SIZE_MB),
        };

        Ok(Config {
            base,
            database_url: var("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            auth,
            storage,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Fail fast on combinations that must never reach a running server.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.is_production() {
            if self.base.debug {
                return Err(anyhow::anyhow!("DEBUG must not be enabled in production"));
            }
            if self.base.cors_origins.iter().any(|o| o == "*") {
                return Err(anyhow::anyhow!(
                    "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
                ));
            }
        }

        if self.storage.max_upload_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.bucket.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "SUPABASE_STORAGE_BUCKET must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {
                if self.is_production() {
                    return Err(anyhow::anyhow!(
                        "STORAGE_BACKEND=memory is not allowed in production"
                    ));
                }
            }
        }

        Ok(())
    }

    /// The development bypass is honoured only outside production.
    pub fn dev_bypass_user(&self) -> Option<Uuid> {
        if self.base.debug && !self.is_production() {
            self.base.dev_user_id
        } else {
            None
        }
    }

    /// `{SUPABASE_URL}/auth/v1/.well-known/jwks.json`, when a provider URL is configured.
    pub fn jwks_url(&self) -> Option<String> {
        self.auth
            .supabase_url
            .as_ref()
            .map(|url| format!("{}/auth/v1/.well-known/jwks.json", url.trim_end_matches('/')))
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn app_name(&self) -> &str {
        &self.base.app_name
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.base.db_timeout_seconds
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.storage.max_upload_bytes()
    }
}
