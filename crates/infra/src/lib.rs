//! # NudgeKit Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - Keyring-backed secure token storage
//! - JSON-file key/value persistence for the offline outbox
//! - The reqwest-based campaign backend client
//!
//! ## Architecture
//! - Implements traits defined in `nudgekit-core`
//! - Contains all "impure" code (keychain, HTTP, filesystem)

pub mod api;
pub mod keychain;
pub mod storage;

// Re-export commonly used items
pub use api::ApiClient;
pub use keychain::KeychainTokenStore;
pub use storage::FileStore;
