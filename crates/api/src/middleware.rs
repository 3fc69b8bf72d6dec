//! Cross-cutting request stages, installed by [`crate::app::start_with`] in this order:
//! response encryption first, then the context gate, then the routers.

pub mod context;
pub mod encryption;

pub use context::{GateState, context_gate};
pub use encryption::{ENCRYPTION_HEADER, InterceptorState, ResponseSeal, encrypt_response};
