use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend kinds
///
/// This enum defines the available storage backends for uploaded media.
/// It's defined in core because it's used in configuration and selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Local,
    DataUrl,
    Memory,
    S3,
}

impl FromStr for StorageBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackendKind::Local),
            "dataurl" | "data_url" => Ok(StorageBackendKind::DataUrl),
            "memory" => Ok(StorageBackendKind::Memory),
            "s3" => Ok(StorageBackendKind::S3),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackendKind::Local => write!(f, "local"),
            StorageBackendKind::DataUrl => write!(f, "dataurl"),
            StorageBackendKind::Memory => write!(f, "memory"),
            StorageBackendKind::S3 => write!(f, "s3"),
        }
    }
}
