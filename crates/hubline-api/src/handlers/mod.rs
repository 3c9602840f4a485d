//! Route handlers organized by domain.

pub mod health;
pub mod internal;
pub mod ws;
