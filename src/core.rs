//! The core module defines the business logic of stowage.
//! It provides the traits and models upstream adapters need to implement.

pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod storage;

use sha2::{Digest, Sha256};

/// Hex encoded SHA-256 digest of the input. Used for anything secret we persist,
/// i.e. session tokens and one-time codes.
pub fn sha256(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}
