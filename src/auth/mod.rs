pub mod digest;
pub mod session;

pub use digest::{default_reference_digest, hash_password};
pub use session::{GateState, SessionGate, SessionRecord};
