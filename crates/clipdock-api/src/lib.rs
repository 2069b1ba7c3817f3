//! Clipdock HTTP API
//!
//! The binary entrypoint lives in `main.rs`; everything else is exported here
//! so integration tests can build the router against in-memory backends.

pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
