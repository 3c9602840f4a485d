//! Connection registry and message router.
//!
//! A single task ([`Hub::run`]) owns the user → connection map. Everything
//! else talks to it through a cloneable [`HubHandle`].

mod command;
pub mod handle;
pub mod registry;

pub use command::DeliveryKind;
pub use handle::HubHandle;
pub use registry::Hub;
