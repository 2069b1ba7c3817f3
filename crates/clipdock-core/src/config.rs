//! Configuration module
//!
//! Process configuration for the upload service, loaded from environment
//! variables (a `.env` file is read by the binary before calling
//! [`Config::from_env`]).

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackendKind;

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_THUMBNAIL_BYTES: u64 = 10 << 20; // 10 MB
const MAX_VIDEO_BYTES: u64 = 1 << 30; // 1 GB
const DB_MAX_CONNECTIONS: u32 = 20;

/// Which implementation backs the video metadata store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBackend {
    Postgres,
    Memory,
}

impl FromStr for MetadataBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(MetadataBackend::Postgres),
            "memory" => Ok(MetadataBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid metadata backend: {}", s)),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    environment: String,
    cors_origins: Vec<String>,
    jwt_secret: String,
    metadata_backend: MetadataBackend,
    database_url: Option<String>,
    db_max_connections: u32,
    storage_backend: StorageBackendKind,
    storage_root_dir: Option<String>,
    public_base_url: String,
    s3_bucket: Option<String>,
    s3_region: Option<String>,
    s3_endpoint: Option<String>,
    max_thumbnail_bytes: u64,
    max_video_bytes: u64,
    spool_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let metadata_backend = env::var("METADATA_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse::<MetadataBackend>()?;

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageBackendKind>()?;

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            metadata_backend,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DB_MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(DB_MAX_CONNECTIONS),
            storage_backend,
            storage_root_dir: env::var("STORAGE_ROOT_DIR").ok(),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", SERVER_PORT)),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            max_thumbnail_bytes: env::var("MAX_THUMBNAIL_BYTES")
                .unwrap_or_else(|_| MAX_THUMBNAIL_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_THUMBNAIL_BYTES),
            max_video_bytes: env::var("MAX_VIDEO_BYTES")
                .unwrap_or_else(|_| MAX_VIDEO_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_VIDEO_BYTES),
            spool_dir: env::var("SPOOL_DIR").ok(),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn metadata_backend(&self) -> MetadataBackend {
        self.metadata_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn storage_backend(&self) -> StorageBackendKind {
        self.storage_backend
    }

    pub fn storage_root_dir(&self) -> Option<&str> {
        self.storage_root_dir.as_deref()
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn max_thumbnail_bytes(&self) -> u64 {
        self.max_thumbnail_bytes
    }

    pub fn max_video_bytes(&self) -> u64 {
        self.max_video_bytes
    }

    pub fn spool_dir(&self) -> Option<&str> {
        self.spool_dir.as_deref()
    }

    /// Build a configuration directly, bypassing the environment. Intended for tests.
    pub fn for_tests(
        jwt_secret: impl Into<String>,
        storage_backend: StorageBackendKind,
        public_base_url: impl Into<String>,
        max_thumbnail_bytes: u64,
        max_video_bytes: u64,
    ) -> Self {
        Config {
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            jwt_secret: jwt_secret.into(),
            metadata_backend: MetadataBackend::Memory,
            database_url: None,
            db_max_connections: DB_MAX_CONNECTIONS,
            storage_backend,
            storage_root_dir: None,
            public_base_url: public_base_url.into(),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            max_thumbnail_bytes,
            max_video_bytes,
            spool_dir: None,
        }
    }
}
