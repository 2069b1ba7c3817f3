//! Shared constants

/// Version prefix for all video routes. The health endpoint is unversioned.
///
/// The memory storage backend builds its retrieval URLs from this prefix, so
/// it lives here rather than in the api crate.
pub const API_PREFIX: &str = "/api/v0";
