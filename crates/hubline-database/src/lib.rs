//! # hubline-database
//!
//! PostgreSQL connection management and the adapters that let the router
//! talk to the platform's existing tables: message persistence, group
//! membership and chat permissions, and session lookup.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{ChatRepository, MembershipRepository, SessionRepository};
