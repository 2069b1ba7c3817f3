//! Configuration validation - fail fast on misconfiguration before anything
//! binds a port or touches a backend.

use anyhow::{bail, Result};
use clipdock_core::{Config, MetadataBackend, StorageBackendKind};

pub fn validate_config(config: &Config) -> Result<()> {
    if config.is_production() && config.jwt_secret().len() < 32 {
        bail!("JWT_SECRET must be at least 32 characters long in production");
    }

    if config.metadata_backend() == MetadataBackend::Postgres && config.database_url().is_none() {
        bail!("DATABASE_URL must be set when METADATA_BACKEND=postgres");
    }

    match config.storage_backend() {
        StorageBackendKind::Local => {
            if config.storage_root_dir().is_none() {
                bail!("STORAGE_ROOT_DIR must be set when STORAGE_BACKEND=local");
            }
        }
        StorageBackendKind::S3 => {
            if config.s3_bucket().is_none() {
                bail!("S3_BUCKET must be set when STORAGE_BACKEND=s3");
            }
            if config.s3_region().is_none() {
                bail!("S3_REGION or AWS_REGION must be set when STORAGE_BACKEND=s3");
            }
        }
        StorageBackendKind::Memory | StorageBackendKind::DataUrl => {
            if config.is_production() {
                tracing::warn!(
                    backend = %config.storage_backend(),
                    "Volatile storage backend selected in production; uploads will not survive a restart"
                );
            }
        }
    }

    if config.max_thumbnail_bytes() == 0 || config.max_video_bytes() == 0 {
        bail!("Upload size limits must be greater than zero");
    }

    Ok(())
}
