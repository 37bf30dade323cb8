//! # ab-platform
//!
//! Platform-specific implementations for appbridge.
//!
//! This crate contains the adapters that touch the operating system: the
//! cross-process exclusivity primitive behind single-instance enforcement and
//! the per-user directory layout.

pub mod app_dirs;
pub mod exclusivity;

pub use app_dirs::DirsAppDirsAdapter;
#[cfg(unix)]
pub use exclusivity::LocalSocketExclusivity;
pub use exclusivity::InProcessExclusivity;
