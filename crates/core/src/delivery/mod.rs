//! SDK-facing delivery facade: live send with outbox fallback.

pub mod ports;
pub mod service;

pub use ports::CampaignTransport;
pub use service::{DeliveryService, FlushReport};
