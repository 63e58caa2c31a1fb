//! Account authentication: ports and the session state machine.

pub mod ports;
pub mod session;

pub use ports::{AccountValidator, TokenStore};
pub use session::AuthSession;
