//! # Taskboard Shared Library
//!
//! Domain types, access-control policy and services for the Taskboard API.
//!
//! ## Module Organization
//!
//! - `models`: users, projects, tasks, comments and their SQL
//! - `auth`: credential hashing, bearer tokens and the authorization policy
//! - `store`: storage trait with PostgreSQL and in-memory backends
//! - `db`: connection pool and migrations
//! - `services`: the operations the API exposes

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
