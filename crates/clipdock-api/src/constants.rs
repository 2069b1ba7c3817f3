pub use clipdock_core::constants::API_PREFIX;
