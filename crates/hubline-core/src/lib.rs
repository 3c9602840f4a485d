//! # hubline-core
//!
//! Core crate for Hubline. Contains configuration schemas, typed
//! identifiers, the collaborator traits the router consumes (membership
//! oracle, message store, session resolver) and the unified error system.
//!
//! This crate has **no** internal dependencies on other Hubline crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
