//! # Tasklane Shared Library
//!
//! This crate contains the domain model, persistence layer and credential /
//! notification utilities used by the Tasklane API server.
//!
//! ## Module Organization
//!
//! - `auth`: Token issuance, password hashing, request identity and access policies
//! - `db`: PostgreSQL pool and embedded migrations
//! - `merge`: Allow-listed field merge used by create/update paths
//! - `models`: Database models and their queries
//! - `notify`: Templated email dispatch (direct SMTP or queued)
//! - `store`: Storage trait with PostgreSQL and in-memory backends

pub mod auth;
pub mod db;
pub mod merge;
pub mod models;
pub mod notify;
pub mod store;

/// Current version of the Tasklane shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
