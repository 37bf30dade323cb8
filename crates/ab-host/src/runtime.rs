//! The single dispatch context.
//!
//! Host events, forwarded launches and the shutdown signal are all consumed
//! by one `select!` loop, so listeners and the forward callback never run
//! concurrently with each other.

use std::future::Future;
use std::sync::Arc;

use ab_app::usecases::ProcessControl;
use ab_app::AppLifecycle;
use ab_core::ports::ForwardedLaunchReceiver;
use tracing::{debug, info, warn};

use crate::host::{HostMessage, HostMessageReceiver};

pub struct LifecycleRuntime {
    lifecycle: Arc<AppLifecycle>,
    host_rx: HostMessageReceiver,
    forwarded_rx: ForwardedLaunchReceiver,
}

impl LifecycleRuntime {
    pub fn new(
        lifecycle: Arc<AppLifecycle>,
        host_rx: HostMessageReceiver,
        forwarded_rx: ForwardedLaunchReceiver,
    ) -> Self {
        Self {
            lifecycle,
            host_rx,
            forwarded_rx,
        }
    }

    /// Dispatch until the host asks to exit, returning the exit code.
    ///
    /// When `shutdown` completes the lifecycle is asked to `quit`, so the
    /// usual quit events still fire before the loop ends.
    pub async fn run<S>(mut self, shutdown: S) -> i32
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut shutdown_requested = false;
        let mut forwarded_open = true;

        loop {
            tokio::select! {
                message = self.host_rx.recv() => match message {
                    Some(HostMessage::Event(event)) => {
                        if !event.is_known() {
                            debug!(event = %event.name, "Dispatching custom host event");
                        }
                        let report = self.lifecycle.handle_host_event(&event);
                        if report.failed > 0 {
                            warn!(event = %event.name, failed = report.failed, "Some listeners failed");
                        }
                    }
                    Some(HostMessage::Exit(code)) => {
                        info!(code, "Leaving dispatch loop");
                        return code;
                    }
                    None => {
                        debug!("Host channel closed");
                        return 0;
                    }
                },
                attempt = self.forwarded_rx.recv(), if forwarded_open => match attempt {
                    Some(attempt) => self.lifecycle.deliver_forwarded_launch(attempt),
                    None => forwarded_open = false,
                },
                _ = &mut shutdown, if !shutdown_requested => {
                    shutdown_requested = true;
                    info!("Shutdown signal received");
                    if let Err(err) = self.lifecycle.quit() {
                        warn!(error = %err, "Host refused to quit, exiting");
                        return 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{host_message_channel, HeadlessHost};
    use ab_app::AppLifecycleDeps;
    use ab_core::{Event, InstanceIdentity, LaunchAttempt};
    use ab_platform::InProcessExclusivity;

    #[tokio::test]
    async fn closed_host_channel_ends_loop() {
        let (tx, rx) = host_message_channel();
        let (unrelated_tx, _unrelated_rx) = host_message_channel();
        let (lifecycle, forwarded_rx) = AppLifecycle::from_deps(AppLifecycleDeps {
            host: Arc::new(HeadlessHost::new("demo", "1", unrelated_tx)),
            exclusivity: Arc::new(InProcessExclusivity::new()),
            identity: InstanceIdentity::new("demo"),
            launch: LaunchAttempt::new(vec![], "/"),
        });
        drop(tx);

        let code = LifecycleRuntime::new(Arc::new(lifecycle), rx, forwarded_rx)
            .run(std::future::pending())
            .await;
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn custom_host_events_reach_listeners() {
        let (tx, rx) = host_message_channel();
        let (unrelated_tx, _unrelated_rx) = host_message_channel();
        let (lifecycle, forwarded_rx) = AppLifecycle::from_deps(AppLifecycleDeps {
            host: Arc::new(HeadlessHost::new("demo", "1", unrelated_tx)),
            exclusivity: Arc::new(InProcessExclusivity::new()),
            identity: InstanceIdentity::new("demo"),
            launch: LaunchAttempt::new(vec![], "/"),
        });
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        lifecycle.on("plugin-installed", move |event| {
            sink.lock().unwrap().push(event.payload.clone());
            Ok(())
        });

        let custom = Event::new("plugin-installed", vec![serde_json::json!("x")]);
        assert!(!custom.is_known());
        tx.send(HostMessage::Event(custom)).unwrap();
        tx.send(HostMessage::Exit(0)).unwrap();

        let code = LifecycleRuntime::new(Arc::new(lifecycle), rx, forwarded_rx)
            .run(std::future::pending())
            .await;
        assert_eq!(code, 0);
        assert_eq!(*seen.lock().unwrap(), vec![vec![serde_json::json!("x")]]);
    }
}
