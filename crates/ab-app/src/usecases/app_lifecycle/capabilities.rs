//! Capability interfaces over the host application object.
//!
//! Each trait groups a handful of related commands so collaborators can
//! depend on (and tests can fake) only the slice they use.

use std::path::{Path, PathBuf};

use ab_core::{InstanceRole, PathName, RelaunchOptions};
use async_trait::async_trait;

use crate::usecases::command_channel::{CommandError, HostError};
use crate::usecases::single_instance::{CoordinatorError, ForwardCallback};

pub trait ProcessControl {
    /// Ask the host to close all windows and quit.
    fn quit(&self) -> Result<(), HostError>;

    /// Exit immediately with `code` (0 when unset), skipping quit events.
    fn exit(&self, code: Option<i32>) -> Result<(), HostError>;

    /// Schedule a relaunch for when this instance exits.
    fn relaunch(&self, options: RelaunchOptions) -> Result<(), HostError>;
}

pub trait WindowControl {
    fn focus(&self) -> Result<(), HostError>;
    fn hide(&self) -> Result<(), HostError>;
    fn show(&self) -> Result<(), HostError>;
}

pub trait PathManagement {
    fn get_app_path(&self) -> Result<PathBuf, CommandError>;
    fn get_path(&self, name: PathName) -> Result<PathBuf, CommandError>;
    fn set_path(&self, name: PathName, path: &Path) -> Result<(), HostError>;
}

pub trait AppInfo {
    fn get_name(&self) -> Result<String, CommandError>;
    fn set_name(&self, name: &str) -> Result<(), HostError>;
    fn get_version(&self) -> Result<String, CommandError>;
    fn get_locale(&self) -> Result<String, CommandError>;
}

pub trait CommandLineSwitches {
    fn append_switch(&self, switch: &str, value: Option<&str>) -> Result<(), HostError>;
    fn append_argument(&self, value: &str) -> Result<(), HostError>;
}

#[async_trait]
pub trait SingleInstance {
    /// Returns `true` when this process should quit because another instance
    /// is primary and has received this launch.
    async fn make_single_instance(&self, callback: ForwardCallback)
        -> Result<bool, CoordinatorError>;

    async fn release_single_instance(&self) -> Result<(), CoordinatorError>;

    fn instance_role(&self) -> InstanceRole;
}
