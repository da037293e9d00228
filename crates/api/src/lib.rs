//! authgate API server library.
//!
//! Exposes the building blocks (config, state, auth workflow, error handling,
//! routes) so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
