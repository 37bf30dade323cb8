use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::instance::InstanceIdentity;
use crate::launch::LaunchAttempt;
use crate::ports::errors::ExclusivityError;

/// Where a held exclusivity token delivers launch attempts forwarded by
/// later instances.
pub type ForwardedLaunchSender = mpsc::UnboundedSender<LaunchAttempt>;
pub type ForwardedLaunchReceiver = mpsc::UnboundedReceiver<LaunchAttempt>;

pub fn forwarded_launch_channel() -> (ForwardedLaunchSender, ForwardedLaunchReceiver) {
    mpsc::unbounded_channel()
}

/// Outcome of one acquisition attempt.
pub enum Acquisition {
    /// This process now holds the token.
    Held(Box<dyn ExclusivityGuard>),
    /// Another process holds the token; the forwarder reaches it.
    Conflict(Box<dyn LaunchForwarder>),
}

impl std::fmt::Debug for Acquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Acquisition::Held(_) => f.write_str("Acquisition::Held"),
            Acquisition::Conflict(_) => f.write_str("Acquisition::Conflict"),
        }
    }
}

/// Cross-process mutual exclusion keyed by instance identity.
///
/// # Behavior
/// - `acquire` is a single atomic test-and-set against an OS-visible resource.
/// - While held, every launch forwarded by a conflicting process is pushed
///   into `inbox`, in arrival order.
/// - The token must be released by the OS when the holder dies, so crash
///   safety never depends on [`ExclusivityGuard::release`] being called.
#[async_trait]
pub trait ExclusivityPort: Send + Sync {
    async fn acquire(
        &self,
        identity: &InstanceIdentity,
        inbox: ForwardedLaunchSender,
    ) -> Result<Acquisition, ExclusivityError>;
}

/// A held exclusivity token.
///
/// Dropping the guard releases the token as well; `release` exists so the
/// caller can observe failures.
#[async_trait]
pub trait ExclusivityGuard: Send + Sync {
    async fn release(self: Box<Self>) -> Result<(), ExclusivityError>;
}

/// Side channel from a conflicting launch to the current holder.
#[async_trait]
pub trait LaunchForwarder: Send + Sync {
    async fn forward(self: Box<Self>, attempt: LaunchAttempt) -> Result<(), ExclusivityError>;
}
