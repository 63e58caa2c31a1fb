//! Common utilities shared across NudgeKit crates.
//!
//! Currently this is the retry/backoff schedule; error classification lives
//! on the error types themselves in `nudgekit-domain`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod retry;

pub use retry::BackoffPolicy;
