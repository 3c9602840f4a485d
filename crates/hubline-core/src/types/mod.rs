//! Core type definitions used across the Hubline workspace.

pub mod id;

pub use id::*;
