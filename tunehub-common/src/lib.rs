//! # TuneHub Common Library
//!
//! Shared code for the TuneHub music-sharing service:
//! - Database layer (schema initialization, per-entity operations)
//! - Access-control policy (roles and ownership checks)
//! - Password hashing and session tokens
//! - Configuration loading
//! - Common error types

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod policy;

pub use error::{Error, Result};
pub use policy::Role;
