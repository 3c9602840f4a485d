//! Collaborator traits defined in `hubline-core` and implemented by the
//! database crate (production) or by in-memory fakes (tests).

pub mod membership;
pub mod session;
pub mod store;

pub use membership::MembershipOracle;
pub use session::SessionResolver;
pub use store::{MessageStore, NewGroupMessage, NewPrivateMessage};
