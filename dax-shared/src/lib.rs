//! # Dax Shared Library
//!
//! Types, persistence and authentication primitives shared by the Dax API
//! server and the `dax-admin` operator tool.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, vaults, contributors, entries)
//! - `auth`: Password hashing, JWT tokens and the request auth context
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Dax shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
