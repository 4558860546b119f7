//! Recodarr - Radarr webhook receiver that re-encodes imported movies
//!
//! This library crate exposes the core functionality for integration testing.

pub mod arr;
pub mod config;
pub mod notifications;
pub mod processor;
pub mod server;
pub mod state;
