//! # NudgeKit Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for secure storage, key/value
//!   persistence, and the campaign backend
//! - The authentication session state machine
//! - The offline outbox and the delivery facade
//!
//! ## Architecture Principles
//! - Only depends on `nudgekit-common` and `nudgekit-domain`
//! - No keychain, HTTP, or filesystem code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth;
pub mod delivery;
pub mod outbox;

// Re-export specific items to avoid ambiguity
pub use auth::ports::{AccountValidator, TokenStore};
pub use auth::session::{AuthSession, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use delivery::ports::CampaignTransport;
pub use delivery::service::{DeliveryService, FlushReport};
pub use outbox::ports::KeyValueStore;
pub use outbox::store::OfflineOutbox;
