use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use ab_core::ports::{
    forwarded_launch_channel, Acquisition, ExclusivityGuard, ExclusivityPort,
    ForwardedLaunchReceiver, ForwardedLaunchSender,
};
use ab_core::{InstanceIdentity, InstanceRole, LaunchAttempt};
use tracing::{debug, info, warn};

use super::CoordinatorError;

/// Callback receiving launch attempts forwarded by secondary instances.
pub type ForwardCallback = Arc<dyn Fn(&LaunchAttempt) + Send + Sync>;

struct CoordinatorState {
    role: InstanceRole,
    guard: Option<Box<dyn ExclusivityGuard>>,
    callback: Option<ForwardCallback>,
    ready: bool,
    pending: VecDeque<LaunchAttempt>,
}

/// Runs the single-instance protocol for one process.
///
/// Forwarded launches never reach the callback before the host is ready:
/// anything that arrives earlier is queued and flushed, in arrival order, by
/// [`mark_ready`](Self::mark_ready).
///
/// The coordinator never terminates the process. A `true` from
/// [`register`](Self::register) tells the caller to quit.
pub struct SingleInstanceCoordinator {
    exclusivity: Arc<dyn ExclusivityPort>,
    identity: InstanceIdentity,
    launch: LaunchAttempt,
    inbox: ForwardedLaunchSender,
    state: Mutex<CoordinatorState>,
}

impl SingleInstanceCoordinator {
    /// Create a coordinator for `identity`.
    ///
    /// The returned receiver yields launches forwarded to this process while
    /// it is primary; feed each one back through
    /// [`deliver`](Self::deliver) from the dispatch loop.
    pub fn new(
        exclusivity: Arc<dyn ExclusivityPort>,
        identity: InstanceIdentity,
        launch: LaunchAttempt,
    ) -> (Self, ForwardedLaunchReceiver) {
        let (inbox, inbox_rx) = forwarded_launch_channel();
        let coordinator = Self {
            exclusivity,
            identity,
            launch,
            inbox,
            state: Mutex::new(CoordinatorState {
                role: InstanceRole::Unregistered,
                guard: None,
                callback: None,
                ready: false,
                pending: VecDeque::new(),
            }),
        };
        (coordinator, inbox_rx)
    }

    pub fn identity(&self) -> &InstanceIdentity {
        &self.identity
    }

    pub fn launch(&self) -> &LaunchAttempt {
        &self.launch
    }

    pub fn role(&self) -> InstanceRole {
        self.state().role
    }

    pub fn is_primary(&self) -> bool {
        self.role() == InstanceRole::Primary
    }

    /// Launches waiting for readiness.
    pub fn pending_count(&self) -> usize {
        self.state().pending.len()
    }

    /// Register `callback` and settle this process' role.
    ///
    /// Returns `Ok(false)` when this process is primary and should keep
    /// starting up, `Ok(true)` when its launch was forwarded to the primary
    /// and it should quit. While primary, a second call replaces the callback.
    pub async fn register<F>(&self, callback: F) -> Result<bool, CoordinatorError>
    where
        F: Fn(&LaunchAttempt) + Send + Sync + 'static,
    {
        self.register_callback(Arc::new(callback)).await
    }

    pub async fn register_callback(
        &self,
        callback: ForwardCallback,
    ) -> Result<bool, CoordinatorError> {
        let previous = {
            let mut state = self.state();
            match state.role {
                InstanceRole::Primary => {
                    debug!(identity = %self.identity, "Replacing forward callback");
                    state.callback = Some(callback);
                    return Ok(false);
                }
                InstanceRole::Secondary => return Ok(true),
                InstanceRole::Attempting => return Err(CoordinatorError::RegistrationInProgress),
                role @ (InstanceRole::Unregistered | InstanceRole::Released) => {
                    state.role = InstanceRole::Attempting;
                    role
                }
            }
        };

        let acquisition = match self
            .exclusivity
            .acquire(&self.identity, self.inbox.clone())
            .await
        {
            Ok(acquisition) => acquisition,
            Err(err) => {
                self.state().role = previous;
                return Err(err.into());
            }
        };

        match acquisition {
            Acquisition::Held(guard) => {
                let mut state = self.state();
                state.role = InstanceRole::Primary;
                state.guard = Some(guard);
                state.callback = Some(callback);
                info!(identity = %self.identity, "Acquired single instance, running as primary");
                Ok(false)
            }
            Acquisition::Conflict(forwarder) => {
                if let Err(err) = forwarder.forward(self.launch.clone()).await {
                    self.state().role = previous;
                    return Err(err.into());
                }
                self.state().role = InstanceRole::Secondary;
                info!(
                    identity = %self.identity,
                    launch_id = %self.launch.launch_id,
                    "Another instance is primary, launch forwarded"
                );
                Ok(true)
            }
        }
    }

    /// Give up the exclusivity token so other launches can become primary.
    ///
    /// Only valid while primary. Pending forwards are discarded together with
    /// the callback.
    pub async fn release(&self) -> Result<(), CoordinatorError> {
        let guard = {
            let mut state = self.state();
            if state.role != InstanceRole::Primary {
                return Err(CoordinatorError::NotPrimary { role: state.role });
            }
            state.role = InstanceRole::Released;
            state.callback = None;
            let dropped = state.pending.len();
            state.pending.clear();
            if dropped > 0 {
                warn!(identity = %self.identity, dropped, "Discarding undelivered forwarded launches");
            }
            state.guard.take()
        };

        if let Some(guard) = guard {
            guard.release().await?;
        }
        info!(identity = %self.identity, "Released single instance");
        Ok(())
    }

    /// Whether the host has emitted "ready".
    pub fn is_ready(&self) -> bool {
        self.state().ready
    }

    /// Record that the host emitted "ready" and flush queued forwards.
    ///
    /// Only the first call has any effect.
    pub fn mark_ready(&self) {
        if self.enter_ready() {
            self.flush_pending();
        }
    }

    /// Flip to ready without flushing. Returns `true` on the first call only.
    ///
    /// Forwards delivered before [`flush_pending`](Self::flush_pending) runs
    /// keep queueing behind the ones already waiting.
    pub fn enter_ready(&self) -> bool {
        let mut state = self.state();
        !std::mem::replace(&mut state.ready, true)
    }

    /// Hand every queued forward to the callback, in arrival order.
    pub fn flush_pending(&self) {
        loop {
            let (callback, pending) = {
                let mut state = self.state();
                if state.pending.is_empty() {
                    return;
                }
                (state.callback.clone(), std::mem::take(&mut state.pending))
            };

            debug!(count = pending.len(), "Flushing forwarded launches queued before ready");
            if let Some(callback) = callback {
                for attempt in &pending {
                    callback(attempt);
                }
            }
        }
    }

    /// Hand a forwarded launch to the callback, or queue it until ready.
    pub fn deliver(&self, attempt: LaunchAttempt) {
        let callback = {
            let mut state = self.state();
            if state.role != InstanceRole::Primary {
                warn!(
                    role = %state.role,
                    launch_id = %attempt.launch_id,
                    "Dropping forwarded launch, not primary"
                );
                return;
            }
            if !state.ready || !state.pending.is_empty() {
                debug!(launch_id = %attempt.launch_id, "Queueing forwarded launch until ready");
                state.pending.push_back(attempt);
                return;
            }
            state.callback.clone()
        };

        if let Some(callback) = callback {
            debug!(launch_id = %attempt.launch_id, argv = ?attempt.argv, "Delivering forwarded launch");
            callback(&attempt);
        }
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
