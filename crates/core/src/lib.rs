//! Domain types shared by every authgate crate.
//!
//! - [`error`] -- the workflow's failure taxonomy.
//! - [`types`] -- id and timestamp aliases.
//! - [`validation`] -- input checks for registration and login.

pub mod error;
pub mod types;
pub mod validation;
