use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use ab_core::ports::{
    Acquisition, ExclusivityError, ExclusivityGuard, ExclusivityPort, ForwardedLaunchSender,
    LaunchForwarder,
};
use ab_core::{InstanceIdentity, LaunchAttempt};
use async_trait::async_trait;
use tracing::debug;

struct Holder {
    token: u64,
    inbox: ForwardedLaunchSender,
}

type Holders = Arc<Mutex<HashMap<InstanceIdentity, Holder>>>;

/// Exclusivity scoped to one process.
///
/// Clones share the same table, so every clone behaves like a separate
/// launch competing on one machine. Used by tests and by hosts that embed
/// several applications in one process. A holder whose inbox receiver has
/// been dropped counts as dead, mirroring OS cleanup of a crashed process.
#[derive(Clone, Default)]
pub struct InProcessExclusivity {
    holders: Holders,
    next_token: Arc<AtomicU64>,
}

impl InProcessExclusivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, identity: &InstanceIdentity) -> bool {
        lock(&self.holders)
            .get(identity)
            .map(|holder| !holder.inbox.is_closed())
            .unwrap_or(false)
    }
}

#[async_trait]
impl ExclusivityPort for InProcessExclusivity {
    async fn acquire(
        &self,
        identity: &InstanceIdentity,
        inbox: ForwardedLaunchSender,
    ) -> Result<Acquisition, ExclusivityError> {
        let mut holders = lock(&self.holders);

        if let Some(holder) = holders.get(identity) {
            if !holder.inbox.is_closed() {
                debug!(%identity, "In-process exclusivity already held");
                return Ok(Acquisition::Conflict(Box::new(InProcessForwarder {
                    inbox: holder.inbox.clone(),
                })));
            }
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        holders.insert(identity.clone(), Holder { token, inbox });
        debug!(%identity, token, "In-process exclusivity acquired");
        Ok(Acquisition::Held(Box::new(InProcessGuard {
            holders: self.holders.clone(),
            identity: identity.clone(),
            token,
        })))
    }
}

struct InProcessGuard {
    holders: Holders,
    identity: InstanceIdentity,
    token: u64,
}

impl InProcessGuard {
    fn vacate(&self) {
        let mut holders = lock(&self.holders);
        if holders.get(&self.identity).map(|h| h.token) == Some(self.token) {
            holders.remove(&self.identity);
        }
    }
}

impl Drop for InProcessGuard {
    fn drop(&mut self) {
        self.vacate();
    }
}

#[async_trait]
impl ExclusivityGuard for InProcessGuard {
    async fn release(self: Box<Self>) -> Result<(), ExclusivityError> {
        self.vacate();
        Ok(())
    }
}

struct InProcessForwarder {
    inbox: ForwardedLaunchSender,
}

#[async_trait]
impl LaunchForwarder for InProcessForwarder {
    async fn forward(self: Box<Self>, attempt: LaunchAttempt) -> Result<(), ExclusivityError> {
        self.inbox
            .send(attempt)
            .map_err(|_| ExclusivityError::Unreachable("primary instance went away".to_string()))
    }
}

fn lock(holders: &Holders) -> MutexGuard<'_, HashMap<InstanceIdentity, Holder>> {
    holders
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
