//! # Pure Data Module - Data Transfer Objects Only
//!
//! ## Responsibilities
//!
//! - Define configuration data structures
//! - Provide TOML → DTO mapping
//!
//! ## Prohibited
//!
//! - No business logic or policies
//! - No validation logic
//!
//! Missing values map to "empty" facts (empty string, zero, `false`), or keep
//! the base value when merging with `AppConfig::merge_toml`.
//! Deciding what an empty value means is the caller's job.

mod app_config;

pub use app_config::{AppConfig, LoggingConfig, SingleInstanceConfig};
