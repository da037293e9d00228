//! Authentication primitives and the register/login workflow.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- signed token issuance and verification.
//! - [`service`] -- [`AuthService`](service::AuthService), which ties both to
//!   the credential store and the session cache.

pub mod jwt;
pub mod password;
pub mod service;
