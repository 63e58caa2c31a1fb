//! Campaign backend HTTP client.

pub mod client;

pub use client::{ApiClient, ApiClientConfig};
