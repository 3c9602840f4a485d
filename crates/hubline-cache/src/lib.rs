//! # hubline-cache
//!
//! Caches sitting in front of the router's collaborators:
//!
//! - [`GroupMemberCache`]: group id → member list, populated lazily from the
//!   membership oracle and dropped only by explicit invalidation
//! - [`SessionCache`]: session token → user id, memoised with a short TTL
//!   using [moka](https://crates.io/crates/moka)

pub mod group_members;
pub mod session;

pub use group_members::GroupMemberCache;
pub use session::SessionCache;
