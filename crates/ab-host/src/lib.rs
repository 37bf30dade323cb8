//! # ab-host
//!
//! Bootstrap and headless host for appbridge: wires configuration, tracing,
//! the platform adapters and the lifecycle use cases into a running process.

pub mod bootstrap;
pub mod host;
pub mod runtime;

pub use host::HeadlessHost;
pub use runtime::LifecycleRuntime;
