//! # NudgeKit Domain
//!
//! Domain types and models for the NudgeKit SDK core.
//!
//! This crate contains:
//! - Pending-record types staged for offline delivery
//! - Credential and configuration structures
//! - Error taxonomy with retry classification
//!
//! ## Architecture
//! - No dependencies on other NudgeKit crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::SdkConfig;
pub use errors::{NudgeKitError, StorageError};
pub use types::{
    AttributeMap, Credentials, PendingCsatResponse, PendingEvent, PendingUserAttributes, TokenPair,
};
