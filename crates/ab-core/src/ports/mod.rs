//! Port interfaces for the application layer
//!
//! Ports define the contract between the lifecycle use cases and the
//! collaborators this crate never implements itself: the host runtime, the
//! cross-process exclusivity primitive and the platform directory layout.
//!
//! ## Port Placement Guidelines
//!
//! A trait belongs here when it is implemented by the platform or host layer
//! and depended upon by more than one use case. Everything else lives next to
//! the use case that needs it.

pub mod app_dirs;
pub mod errors;
pub mod exclusivity;
pub mod host;

pub use app_dirs::AppDirsPort;
pub use errors::{AppDirsError, ExclusivityError};
pub use exclusivity::{
    forwarded_launch_channel, Acquisition, ExclusivityGuard, ExclusivityPort,
    ForwardedLaunchReceiver, ForwardedLaunchSender, LaunchForwarder,
};
pub use host::{HostCommandPort, HostRejection};
