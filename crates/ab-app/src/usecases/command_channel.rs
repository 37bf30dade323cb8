use std::sync::Arc;

use ab_core::ports::HostCommandPort;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// A command the host refused, carrying the host's message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("host rejected '{command}': {message}")]
pub struct HostError {
    pub command: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Host(#[from] HostError),

    /// The host answered, but not with the type the caller asked for.
    #[error("unexpected return value from '{command}': {source}")]
    UnexpectedReturn {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Synchronous forwarding of named commands to the host application object.
///
/// The channel never interprets, retries or recovers from a host failure.
#[derive(Clone)]
pub struct CommandChannel {
    host: Arc<dyn HostCommandPort>,
}

impl CommandChannel {
    pub fn new(host: Arc<dyn HostCommandPort>) -> Self {
        Self { host }
    }

    pub fn invoke(&self, command: &str, args: Vec<Value>) -> Result<Value, HostError> {
        debug!(command, arg_count = args.len(), "Invoking host command");
        self.host.invoke(command, &args).map_err(|rejection| {
            warn!(command, error = %rejection, "Host rejected command");
            HostError {
                command: command.to_string(),
                message: rejection.message,
            }
        })
    }

    /// Invoke and decode the return value.
    pub fn invoke_as<T>(&self, command: &str, args: Vec<Value>) -> Result<T, CommandError>
    where
        T: DeserializeOwned,
    {
        let value = self.invoke(command, args)?;
        serde_json::from_value(value).map_err(|source| CommandError::UnexpectedReturn {
            command: command.to_string(),
            source,
        })
    }

    /// Invoke a command whose return value carries no information.
    pub fn invoke_unit(&self, command: &str, args: Vec<Value>) -> Result<(), HostError> {
        self.invoke(command, args).map(|_| ())
    }
}
