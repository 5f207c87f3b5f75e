//! Core domain types and traits for the Siteship publishing platform.
//!
//! This crate contains:
//! - Resource identifiers and common types
//! - Deploy configuration, artifacts and result types
//! - Credential (SSH key) types and store abstraction
//! - Publish status state machine
//! - Notification abstraction

pub mod credential;
pub mod deploy;
pub mod error;
pub mod id;
pub mod notify;
pub mod status;

pub use error::{Error, Result};
pub use id::ResourceId;
