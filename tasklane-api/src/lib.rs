//! # Tasklane API Server Library
//!
//! HTTP layer of Tasklane: projects, collaborators, invites and tasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response header policy
//! - `routes`: API route handlers
//! - `schema`: Request payload loading and validation

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod schema;
