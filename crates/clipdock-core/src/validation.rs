//! Content validation for upload endpoints
//!
//! Parses declared media types and checks them against the per-endpoint
//! allow-lists. Validation always runs before any payload byte reaches a
//! storage backend.

use crate::error::AppError;

/// Media types accepted by the thumbnail endpoint.
pub const THUMBNAIL_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Media types accepted by the video endpoint.
pub const VIDEO_MEDIA_TYPES: &[&str] = &["video/mp4"];

/// An accepted media type, normalized to its lowercase essence
/// (parameters stripped, e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    slash: usize,
}

impl MediaType {
    /// Parse a raw media-type header, discarding any parameters.
    pub fn parse(header: &str) -> Result<Self, AppError> {
        let essence = header
            .split(';')
            .next()
            .map(|s| s.trim())
            .unwrap_or("")
            .to_lowercase();

        let slash = essence
            .find('/')
            .ok_or_else(|| AppError::InvalidMediaType(format!("Unparseable media type: {header:?}")))?;
        let (ty, subtype) = (&essence[..slash], &essence[slash + 1..]);
        if ty.is_empty() || subtype.is_empty() || subtype.contains('/') {
            return Err(AppError::InvalidMediaType(format!(
                "Unparseable media type: {header:?}"
            )));
        }

        Ok(MediaType { essence, slash })
    }

    /// The full normalized type, e.g. "image/jpeg".
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// The subtype, e.g. "jpeg" or "mp4". Used as the storage key extension.
    pub fn subtype(&self) -> &str {
        &self.essence[self.slash + 1..]
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.essence)
    }
}

/// Parse `header` and check it against `allowed`. Returns the accepted media
/// type on match, `AppError::InvalidMediaType` otherwise.
pub fn validate_media_type(header: &str, allowed: &[&str]) -> Result<MediaType, AppError> {
    let media_type = MediaType::parse(header)?;
    if !allowed.iter().any(|a| media_type.essence() == *a) {
        return Err(AppError::InvalidMediaType(format!(
            "'{}' is not allowed. Allowed types: {}",
            media_type.essence(),
            allowed.join(", ")
        )));
    }
    Ok(media_type)
}
