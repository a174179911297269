/// API route handlers, organized by resource
///
/// - `health`: liveness and store connectivity
/// - `auth`: registration, login, password reset
/// - `users`: the caller's profile and avatar
/// - `projects`: project CRUD with ownership rules
/// - `collaborators`: collaborator removal
/// - `invites`: invitation and acceptance
/// - `tasks`: tasks inside a project

pub mod auth;
pub mod collaborators;
pub mod health;
pub mod invites;
pub mod projects;
pub mod tasks;
pub mod users;

use serde::Serialize;

/// Collection envelope: `{"quantity": n, "results": [...]}`
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub quantity: usize,
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            quantity: results.len(),
            results,
        }
    }
}
