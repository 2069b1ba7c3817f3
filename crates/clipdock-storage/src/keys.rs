//! Shared key generation for storage backends.
//!
//! Key format: `{token}.{subtype}` where `token` is 32 bytes from a
//! cryptographically secure random source, base64 URL-safe encoded without
//! padding, and `subtype` comes from the accepted media type (e.g. "jpeg",
//! "mp4"). Uniqueness is probabilistic only; no backend checks for an
//! existing object under a freshly generated key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use clipdock_core::MediaType;
use rand::RngCore;

const KEY_RANDOM_BYTES: usize = 32;

/// Generate a fresh asset key for the given media type.
pub fn generate_asset_key(media_type: &MediaType) -> String {
    let mut raw = [0u8; KEY_RANDOM_BYTES];
    // ThreadRng is a CSPRNG; fill_bytes cannot fail.
    rand::rng().fill_bytes(&mut raw);
    format!("{}.{}", URL_SAFE_NO_PAD.encode(raw), media_type.subtype())
}
