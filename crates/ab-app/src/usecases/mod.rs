pub mod app_lifecycle;
pub mod command_channel;
pub mod event_bridge;
pub mod single_instance;

pub use app_lifecycle::{
    AppInfo, AppLifecycle, AppLifecycleDeps, CommandLineSwitches, PathManagement, ProcessControl,
    SingleInstance, WindowControl,
};
pub use command_channel::{CommandChannel, CommandError, HostError};
pub use event_bridge::{EmitReport, EventBridge, EventHandler, Listener};
pub use single_instance::{CoordinatorError, ForwardCallback, SingleInstanceCoordinator};
