//! appbridge Application Orchestration Layer
//!
//! This crate contains the lifecycle use cases: the event bridge, the command
//! channel, the single-instance coordinator and the `AppLifecycle`
//! composition root that owns one of each.

pub mod usecases;

pub use usecases::{
    AppLifecycle, AppLifecycleDeps, CommandChannel, CommandError, CoordinatorError, EmitReport,
    EventBridge, HostError, Listener, SingleInstanceCoordinator,
};
