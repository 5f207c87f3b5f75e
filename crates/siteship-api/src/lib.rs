//! API server for Siteship publishing.
//!
//! Exposes the publish workflow and deploy orchestration over HTTP REST.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;
