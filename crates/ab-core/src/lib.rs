//! # ab-core
//!
//! Core domain models and port definitions for appbridge.
//!
//! This crate contains pure domain types without any infrastructure dependencies:
//! lifecycle events, launch attempts, instance identities and the ports the
//! application layer talks through.

// Public module exports
pub mod app_dirs;
pub mod command;
pub mod config;
pub mod event;
pub mod ids;
pub mod instance;
pub mod launch;
pub mod ports;

// Re-export commonly used types at the crate root
pub use command::{PathName, RelaunchOptions};
pub use config::AppConfig;
pub use event::Event;
pub use ids::{LaunchId, ListenerId};
pub use instance::{InstanceIdentity, InstanceRole};
pub use launch::LaunchAttempt;
