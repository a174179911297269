/// Middleware for the API server
///
/// - `security`: response security headers
///
/// Authentication lives in [`crate::app`] because it needs the application state.

pub mod security;
