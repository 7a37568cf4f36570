//! # TaskHive Shared Library
//!
//! This crate contains the types and business logic shared between the
//! TaskHive API server and its integration tests.
//!
//! ## Module Organization
//!
//! - `models`: database row types and their queries
//! - `auth`: password hashing, session tokens, and project authorization
//! - `events`: realtime task events broadcast to project rooms
//! - `db`: connection pooling and migrations

pub mod auth;
pub mod db;
pub mod events;
pub mod models;

/// Current version of the TaskHive shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
