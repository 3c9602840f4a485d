//! Online announcements to group peers.

pub mod announce;

pub use announce::announce_online;
