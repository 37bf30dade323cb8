//! Lock file + Unix domain socket exclusivity.
//!
//! ```text
//! <runtime_dir>/<identity>.lock   advisory lock, the atomic test-and-set
//! <runtime_dir>/<identity>.sock   forwarding channel owned by the holder
//! ```
//!
//! The kernel drops the advisory lock when the holder exits, crash included.
//! A socket file left behind by a dead holder is removed by the next process
//! that wins the lock, before it binds its own.

use std::fs::{File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ab_core::ports::{
    Acquisition, ExclusivityError, ExclusivityGuard, ExclusivityPort, ForwardedLaunchSender,
    LaunchForwarder,
};
use ab_core::{InstanceIdentity, LaunchAttempt};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use super::frame::{self, AckFrame, ForwardFrame};

const DEFAULT_CONNECT_ATTEMPTS: u32 = 20;
const DEFAULT_CONNECT_BACKOFF: Duration = Duration::from_millis(50);
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LocalSocketExclusivity {
    runtime_dir: PathBuf,
    connect_attempts: u32,
    connect_backoff: Duration,
}

impl LocalSocketExclusivity {
    pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            connect_backoff: DEFAULT_CONNECT_BACKOFF,
        }
    }

    /// How a secondary retries while the holder has the lock but has not
    /// bound its socket yet. Zero values keep the defaults.
    pub fn with_connect_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        if attempts > 0 {
            self.connect_attempts = attempts;
        }
        if !backoff.is_zero() {
            self.connect_backoff = backoff;
        }
        self
    }

    pub fn lock_path(&self, identity: &InstanceIdentity) -> PathBuf {
        self.runtime_dir.join(format!("{identity}.lock"))
    }

    pub fn socket_path(&self, identity: &InstanceIdentity) -> PathBuf {
        self.runtime_dir.join(format!("{identity}.sock"))
    }

    fn open_lock_file(&self, identity: &InstanceIdentity) -> Result<File, ExclusivityError> {
        std::fs::create_dir_all(&self.runtime_dir).map_err(|source| {
            ExclusivityError::RuntimeDir {
                path: self.runtime_dir.clone(),
                source,
            }
        })?;

        let path = self.lock_path(identity);
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| ExclusivityError::Lock { path, source })
    }
}

#[async_trait]
impl ExclusivityPort for LocalSocketExclusivity {
    async fn acquire(
        &self,
        identity: &InstanceIdentity,
        inbox: ForwardedLaunchSender,
    ) -> Result<Acquisition, ExclusivityError> {
        let lock_file = self.open_lock_file(identity)?;
        let socket_path = self.socket_path(identity);

        match lock_file.try_lock() {
            Ok(()) => {
                remove_socket_file(&socket_path).map_err(ExclusivityError::Bind)?;
                let listener = UnixListener::bind(&socket_path).map_err(ExclusivityError::Bind)?;
                info!(socket = %socket_path.display(), "Holding single-instance lock");

                let accept_task = tokio::spawn(accept_loop(listener, inbox));
                Ok(Acquisition::Held(Box::new(LocalSocketGuard {
                    lock_file,
                    socket_path,
                    accept_task,
                    released: false,
                })))
            }
            Err(TryLockError::WouldBlock) => {
                debug!(lock = %self.lock_path(identity).display(), "Single-instance lock held by another process");
                Ok(Acquisition::Conflict(Box::new(LocalSocketForwarder {
                    socket_path,
                    connect_attempts: self.connect_attempts,
                    connect_backoff: self.connect_backoff,
                })))
            }
            Err(TryLockError::Error(source)) => Err(ExclusivityError::Lock {
                path: self.lock_path(identity),
                source,
            }),
        }
    }
}

/// Accepts forwarding connections one at a time so launches reach the inbox
/// in the order their connections were accepted.
async fn accept_loop(listener: UnixListener, inbox: ForwardedLaunchSender) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(err) => {
                warn!(error = %err, "Failed to accept forwarding connection");
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };

        match tokio::time::timeout(RECEIVE_TIMEOUT, receive_launch(stream, &inbox)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "Failed to receive forwarded launch"),
            Err(_) => warn!("Timed out receiving forwarded launch"),
        }

        if inbox.is_closed() {
            debug!("Forwarded launch inbox closed, stopping accept loop");
            return;
        }
    }
}

async fn receive_launch(stream: UnixStream, inbox: &ForwardedLaunchSender) -> anyhow::Result<()> {
    let mut framed = Framed::new(stream, frame::codec());
    let bytes = framed
        .next()
        .await
        .ok_or_else(|| anyhow::anyhow!("connection closed before launch frame"))??;
    let ForwardFrame { attempt, .. } = ForwardFrame::decode(&bytes)?;
    let launch_id = attempt.launch_id.clone();
    debug!(%launch_id, argc = attempt.argv.len(), "Received forwarded launch");

    inbox
        .send(attempt)
        .map_err(|_| anyhow::anyhow!("forwarded launch inbox closed"))?;

    framed.send(AckFrame { launch_id }.encode()?).await?;
    Ok(())
}

struct LocalSocketGuard {
    lock_file: File,
    socket_path: PathBuf,
    accept_task: JoinHandle<()>,
    released: bool,
}

impl LocalSocketGuard {
    /// Stop accepting and remove the socket while the lock is still held, so
    /// the next holder never has its fresh socket deleted by us.
    fn teardown(&mut self) -> io::Result<()> {
        self.accept_task.abort();
        remove_socket_file(&self.socket_path)?;
        self.lock_file.unlock()
    }
}

impl Drop for LocalSocketGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.teardown() {
            warn!(error = %err, "Failed to clean up single-instance lock");
        }
    }
}

#[async_trait]
impl ExclusivityGuard for LocalSocketGuard {
    async fn release(mut self: Box<Self>) -> Result<(), ExclusivityError> {
        self.released = true;
        self.teardown()
            .map_err(|err| ExclusivityError::Release(err.to_string()))?;
        info!(socket = %self.socket_path.display(), "Released single-instance lock");
        Ok(())
    }
}

struct LocalSocketForwarder {
    socket_path: PathBuf,
    connect_attempts: u32,
    connect_backoff: Duration,
}

impl LocalSocketForwarder {
    async fn connect(&self) -> Result<UnixStream, ExclusivityError> {
        let mut last_error = None;
        for attempt in 1..=self.connect_attempts {
            match UnixStream::connect(&self.socket_path).await {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    debug!(attempt, error = %err, "Primary instance not accepting yet");
                    last_error = Some(err);
                    tokio::time::sleep(self.connect_backoff).await;
                }
            }
        }
        Err(ExclusivityError::Unreachable(format!(
            "{}: {}",
            self.socket_path.display(),
            last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| "no connect attempts".to_string())
        )))
    }
}

#[async_trait]
impl LaunchForwarder for LocalSocketForwarder {
    async fn forward(self: Box<Self>, attempt: LaunchAttempt) -> Result<(), ExclusivityError> {
        let stream = self.connect().await?;
        let mut framed = Framed::new(stream, frame::codec());
        let launch_id = attempt.launch_id.clone();

        let payload = ForwardFrame::new(attempt)
            .encode()
            .map_err(|err| ExclusivityError::Forward(err.to_string()))?;
        framed
            .send(payload)
            .await
            .map_err(|err| ExclusivityError::Forward(err.to_string()))?;

        let ack = framed
            .next()
            .await
            .ok_or_else(|| {
                ExclusivityError::Forward("primary closed the connection before acknowledging".into())
            })?
            .map_err(|err| ExclusivityError::Forward(err.to_string()))?;
        let ack = AckFrame::decode(&ack).map_err(|err| ExclusivityError::Forward(err.to_string()))?;
        if ack.launch_id != launch_id {
            return Err(ExclusivityError::Forward(format!(
                "acknowledgement for {} does not match {}",
                ack.launch_id, launch_id
            )));
        }

        debug!(%launch_id, "Primary acknowledged forwarded launch");
        Ok(())
    }
}

fn remove_socket_file(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
