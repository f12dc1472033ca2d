//! Module containing concrete implementations from the [core](crate::core) module.

/// Session authentication middleware.
pub mod auth;

/// One-time code delivery implementations.
pub mod notify;

/// Repository implementations.
pub mod repo;

/// HTTP server implementation.
pub mod server;

/// Application state configuration.
pub mod state;

/// Blob storage implementations.
pub mod storage;
