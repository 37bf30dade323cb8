//! Process-wide lifecycle composition root.

mod capabilities;

pub use capabilities::{
    AppInfo, CommandLineSwitches, PathManagement, ProcessControl, SingleInstance, WindowControl,
};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_core::command as cmd;
use ab_core::event as evt;
use ab_core::ports::{ExclusivityPort, ForwardedLaunchReceiver, HostCommandPort};
use ab_core::{Event, InstanceIdentity, InstanceRole, LaunchAttempt, PathName, RelaunchOptions};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::usecases::command_channel::{CommandChannel, CommandError, HostError};
use crate::usecases::event_bridge::{EmitReport, EventBridge, Listener};
use crate::usecases::single_instance::{
    CoordinatorError, ForwardCallback, SingleInstanceCoordinator,
};

/// Owns the event bridge, the command channel and the single-instance
/// coordinator of one process.
///
/// Construct exactly one at process start and pass it (or an `Arc` of it) to
/// whoever needs lifecycle access.
pub struct AppLifecycle {
    events: Arc<EventBridge>,
    commands: Arc<CommandChannel>,
    single_instance: SingleInstanceCoordinator,
}

/// Helper for constructing the lifecycle with explicit dependency fields.
pub struct AppLifecycleDeps {
    pub host: Arc<dyn HostCommandPort>,
    pub exclusivity: Arc<dyn ExclusivityPort>,
    pub identity: InstanceIdentity,
    pub launch: LaunchAttempt,
}

impl AppLifecycle {
    /// Build the lifecycle and hand back the receiver for forwarded launches,
    /// which the dispatch loop drains into
    /// [`deliver_forwarded_launch`](Self::deliver_forwarded_launch).
    pub fn from_deps(deps: AppLifecycleDeps) -> (Self, ForwardedLaunchReceiver) {
        let AppLifecycleDeps {
            host,
            exclusivity,
            identity,
            launch,
        } = deps;

        let (single_instance, forwarded_rx) =
            SingleInstanceCoordinator::new(exclusivity, identity, launch);
        let lifecycle = Self {
            events: Arc::new(EventBridge::new()),
            commands: Arc::new(CommandChannel::new(host)),
            single_instance,
        };
        (lifecycle, forwarded_rx)
    }

    pub fn events(&self) -> &Arc<EventBridge> {
        &self.events
    }

    pub fn commands(&self) -> &Arc<CommandChannel> {
        &self.commands
    }

    pub fn single_instance(&self) -> &SingleInstanceCoordinator {
        &self.single_instance
    }

    /// Whether the host has emitted "ready".
    pub fn is_ready(&self) -> bool {
        self.single_instance.is_ready()
    }

    // ------------------------------------------------------------------
    // Host-side glue
    // ------------------------------------------------------------------

    /// Entry point for every event the host emits.
    ///
    /// "ready" subscribers run before any forwarded launch queued during
    /// startup reaches the forward callback.
    pub fn handle_host_event(&self, event: &Event) -> EmitReport {
        let becomes_ready = event.is_ready() && self.single_instance.enter_ready();
        if becomes_ready {
            info!("Host is ready");
        }

        let report = self.events.emit(event);

        if becomes_ready {
            self.single_instance.flush_pending();
        }
        report
    }

    /// Entry point for launches forwarded by secondary instances.
    pub fn deliver_forwarded_launch(&self, attempt: LaunchAttempt) {
        self.single_instance.deliver(attempt);
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    pub fn on<F>(&self, event: &str, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events.subscribe(event, handler)
    }

    pub fn once<F>(&self, event: &str, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events.subscribe_once(event, handler)
    }

    pub fn off(&self, listener: &Listener) -> bool {
        self.events.unsubscribe(listener)
    }

    pub fn on_ready<F>(&self, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(evt::READY, handler)
    }

    pub fn on_before_quit<F>(&self, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(evt::BEFORE_QUIT, handler)
    }

    pub fn on_will_quit<F>(&self, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(evt::WILL_QUIT, handler)
    }

    pub fn on_quit<F>(&self, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(evt::QUIT, handler)
    }

    pub fn on_window_all_closed<F>(&self, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(evt::WINDOW_ALL_CLOSED, handler)
    }

    pub fn on_activate<F>(&self, handler: F) -> Listener
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(evt::ACTIVATE, handler)
    }

    fn unit(&self, command: &str, args: Vec<Value>) -> Result<(), HostError> {
        self.commands.invoke_unit(command, args)
    }
}

impl ProcessControl for AppLifecycle {
    fn quit(&self) -> Result<(), HostError> {
        self.unit(cmd::QUIT, vec![])
    }

    fn exit(&self, code: Option<i32>) -> Result<(), HostError> {
        self.unit(cmd::EXIT, vec![json!(code.unwrap_or(0))])
    }

    fn relaunch(&self, options: RelaunchOptions) -> Result<(), HostError> {
        let mut object = Map::new();
        if let Some(args) = options.args {
            object.insert("args".to_string(), json!(args));
        }
        if let Some(exec_path) = options.exec_path {
            object.insert("execPath".to_string(), json!(exec_path.to_string_lossy()));
        }
        let args = if object.is_empty() {
            vec![]
        } else {
            vec![Value::Object(object)]
        };
        self.unit(cmd::RELAUNCH, args)
    }
}

impl WindowControl for AppLifecycle {
    fn focus(&self) -> Result<(), HostError> {
        self.unit(cmd::FOCUS, vec![])
    }

    fn hide(&self) -> Result<(), HostError> {
        self.unit(cmd::HIDE, vec![])
    }

    fn show(&self) -> Result<(), HostError> {
        self.unit(cmd::SHOW, vec![])
    }
}

impl PathManagement for AppLifecycle {
    fn get_app_path(&self) -> Result<PathBuf, CommandError> {
        self.commands.invoke_as(cmd::GET_APP_PATH, vec![])
    }

    fn get_path(&self, name: PathName) -> Result<PathBuf, CommandError> {
        self.commands.invoke_as(cmd::GET_PATH, vec![json!(name.as_str())])
    }

    fn set_path(&self, name: PathName, path: &Path) -> Result<(), HostError> {
        self.unit(
            cmd::SET_PATH,
            vec![json!(name.as_str()), json!(path.to_string_lossy())],
        )
    }
}

impl AppInfo for AppLifecycle {
    fn get_name(&self) -> Result<String, CommandError> {
        self.commands.invoke_as(cmd::GET_NAME, vec![])
    }

    fn set_name(&self, name: &str) -> Result<(), HostError> {
        self.unit(cmd::SET_NAME, vec![json!(name)])
    }

    fn get_version(&self) -> Result<String, CommandError> {
        self.commands.invoke_as(cmd::GET_VERSION, vec![])
    }

    fn get_locale(&self) -> Result<String, CommandError> {
        self.commands.invoke_as(cmd::GET_LOCALE, vec![])
    }
}

impl CommandLineSwitches for AppLifecycle {
    fn append_switch(&self, switch: &str, value: Option<&str>) -> Result<(), HostError> {
        let mut args = vec![json!(switch)];
        if let Some(value) = value {
            args.push(json!(value));
        }
        self.unit(cmd::APPEND_SWITCH, args)
    }

    fn append_argument(&self, value: &str) -> Result<(), HostError> {
        self.unit(cmd::APPEND_ARGUMENT, vec![json!(value)])
    }
}

#[async_trait]
impl SingleInstance for AppLifecycle {
    async fn make_single_instance(
        &self,
        callback: ForwardCallback,
    ) -> Result<bool, CoordinatorError> {
        self.single_instance.register_callback(callback).await
    }

    async fn release_single_instance(&self) -> Result<(), CoordinatorError> {
        self.single_instance.release().await
    }

    fn instance_role(&self) -> InstanceRole {
        self.single_instance.role()
    }
}
