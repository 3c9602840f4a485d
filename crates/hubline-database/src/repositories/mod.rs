//! Repository adapters implementing the `hubline-core` collaborator traits.

pub mod chat;
pub mod membership;
pub mod session;

pub use chat::ChatRepository;
pub use membership::MembershipRepository;
pub use session::SessionRepository;
