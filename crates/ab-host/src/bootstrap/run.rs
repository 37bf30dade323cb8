use std::future::Future;
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Weak};

use ab_app::usecases::{SingleInstance, WindowControl};
use ab_app::{AppLifecycle, AppLifecycleDeps};
use ab_core::config::AppConfig;
use ab_core::ports::{AppDirsPort, ExclusivityPort};
use ab_core::{InstanceIdentity, InstanceRole, LaunchAttempt, RelaunchOptions};
use ab_platform::DirsAppDirsAdapter;
use anyhow::Context;
use tracing::{error, info, warn};

use super::config::{resolve_config, DEFAULT_APP_NAME};
use crate::host::{host_message_channel, HeadlessHost, HostMessageReceiver};
use crate::runtime::LifecycleRuntime;

/// Inputs from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    /// Overrides both the config file and the derived identity.
    pub identity: Option<String>,
}

/// Run one launch of the application to completion and return its exit code.
///
/// A launch that finds another primary instance forwards itself and returns
/// 0 without emitting any lifecycle event.
pub async fn run_app(options: RunOptions) -> anyhow::Result<i32> {
    let app_dirs = DirsAppDirsAdapter::new()
        .get_app_dirs()
        .context("Failed to resolve application directories")?;
    let config = resolve_config(options.config_path.as_deref(), &app_dirs)?;

    let logs_dir = config.logging.file.then(|| app_dirs.logs_dir());
    super::tracing::init_tracing_subscriber(logs_dir.as_deref())
        .context("Failed to initialize tracing")?;
    if let Some(dir) = &logs_dir {
        info!(file = %super::tracing::log_file_path(dir).display(), "Logging to file");
    }

    let app_name = if config.app_name.is_empty() {
        DEFAULT_APP_NAME.to_string()
    } else {
        config.app_name.clone()
    };
    let identity = resolve_identity(&options, &config, &app_name);
    let runtime_dir = if config.single_instance.runtime_dir.as_os_str().is_empty() {
        app_dirs.runtime_root.clone()
    } else {
        config.single_instance.runtime_dir.clone()
    };

    let launch = LaunchAttempt::capture();
    info!(
        %identity,
        launch_id = %launch.launch_id,
        argv = ?launch.argv,
        "Starting {app_name}"
    );

    let (host_tx, host_rx) = host_message_channel();
    let host = Arc::new(HeadlessHost::new(&app_name, &config.app_version, host_tx));
    let code = run_lifecycle(
        LaunchParts {
            host: host.clone(),
            host_rx,
            exclusivity: build_exclusivity(&config, runtime_dir),
            identity,
            launch: launch.clone(),
            single_instance: config.single_instance.enabled,
        },
        shutdown_signal(),
    )
    .await?;

    for options in host.take_relaunches() {
        if let Err(err) = spawn_relaunch(&options, &launch) {
            error!(error = %err, "Relaunch failed");
        }
    }

    Ok(code)
}

/// Everything one launch needs once configuration and logging are settled.
pub struct LaunchParts {
    pub host: Arc<HeadlessHost>,
    pub host_rx: HostMessageReceiver,
    pub exclusivity: Arc<dyn ExclusivityPort>,
    pub identity: InstanceIdentity,
    pub launch: LaunchAttempt,
    /// Register for single-instance before starting the host.
    pub single_instance: bool,
}

/// Register, dispatch until exit, then release the single-instance token.
///
/// A secondary launch returns 0 before the host is started. Relaunches the
/// host recorded are left on it for the caller to spawn.
pub async fn run_lifecycle<S>(parts: LaunchParts, shutdown: S) -> anyhow::Result<i32>
where
    S: Future<Output = ()>,
{
    let LaunchParts {
        host,
        host_rx,
        exclusivity,
        identity,
        launch,
        single_instance,
    } = parts;

    let (lifecycle, forwarded_rx) = AppLifecycle::from_deps(AppLifecycleDeps {
        host: host.clone(),
        exclusivity,
        identity,
        launch,
    });
    let lifecycle = Arc::new(lifecycle);

    lifecycle.on_ready(|_| {
        info!("Application ready");
        Ok(())
    });
    lifecycle.on_will_quit(|_| {
        info!("Application will quit");
        Ok(())
    });

    if single_instance {
        let should_quit = lifecycle
            .make_single_instance(forward_callback(Arc::downgrade(&lifecycle)))
            .await
            .context("Single-instance registration failed")?;
        if should_quit {
            info!("Another instance is running, launch handed over");
            return Ok(0);
        }
    }

    host.start();
    let code = LifecycleRuntime::new(lifecycle.clone(), host_rx, forwarded_rx)
        .run(shutdown)
        .await;

    if lifecycle.instance_role() == InstanceRole::Primary {
        if let Err(err) = lifecycle.release_single_instance().await {
            warn!(error = %err, "Failed to release single instance");
        }
    }

    Ok(code)
}

fn resolve_identity(options: &RunOptions, config: &AppConfig, app_name: &str) -> InstanceIdentity {
    match options.identity.as_deref() {
        Some(key) if !key.is_empty() => InstanceIdentity::new(key),
        _ if !config.single_instance.identity.is_empty() => {
            InstanceIdentity::new(&config.single_instance.identity)
        }
        _ => InstanceIdentity::for_current_user(app_name),
    }
}

#[cfg(unix)]
fn build_exclusivity(config: &AppConfig, runtime_dir: PathBuf) -> Arc<dyn ExclusivityPort> {
    Arc::new(
        ab_platform::LocalSocketExclusivity::new(runtime_dir).with_connect_retry(
            config.single_instance.connect_attempts,
            std::time::Duration::from_millis(config.single_instance.connect_backoff_ms),
        ),
    )
}

#[cfg(not(unix))]
fn build_exclusivity(_config: &AppConfig, _runtime_dir: PathBuf) -> Arc<dyn ExclusivityPort> {
    warn!("No cross-process exclusivity on this platform, enforcing within this process only");
    Arc::new(ab_platform::InProcessExclusivity::new())
}

/// Second launches bring the primary to the front.
fn forward_callback(lifecycle: Weak<AppLifecycle>) -> ab_app::usecases::ForwardCallback {
    Arc::new(move |attempt: &LaunchAttempt| {
        info!(
            launch_id = %attempt.launch_id,
            argv = ?attempt.argv,
            working_directory = %attempt.working_directory,
            "Second instance launched"
        );
        if let Some(lifecycle) = lifecycle.upgrade() {
            if let Err(err) = lifecycle.focus() {
                warn!(error = %err, "Failed to focus");
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}

/// How a relaunch is started.
#[derive(Debug, Clone, PartialEq)]
struct RelaunchCommand {
    exec: PathBuf,
    args: Vec<String>,
    cwd: PathBuf,
}

/// Unset options reuse this launch's executable, arguments and working
/// directory.
fn relaunch_command(
    options: &RelaunchOptions,
    launch: &LaunchAttempt,
) -> anyhow::Result<RelaunchCommand> {
    let exec = match &options.exec_path {
        Some(path) => path.clone(),
        None => std::env::current_exe().context("Failed to locate current executable")?,
    };
    let args = match &options.args {
        Some(args) => args.clone(),
        None => launch.argv.iter().skip(1).cloned().collect(),
    };
    Ok(RelaunchCommand {
        exec,
        args,
        cwd: launch.working_directory_path(),
    })
}

fn spawn_relaunch(options: &RelaunchOptions, launch: &LaunchAttempt) -> anyhow::Result<()> {
    let command = relaunch_command(options, launch)?;
    let child = Command::new(&command.exec)
        .args(&command.args)
        .current_dir(&command.cwd)
        .spawn()
        .with_context(|| format!("Failed to spawn {}", command.exec.display()))?;
    info!(pid = child.id(), exec = %command.exec.display(), "Relaunched");
    Ok(())
}
