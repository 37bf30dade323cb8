use serde_json::Value;
use thiserror::Error;

/// Error raised by the host while executing a command.
///
/// Carries the host's own message untouched; the command channel attaches
/// the command name when it surfaces the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostRejection {
    pub message: String,
}

impl HostRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Synchronous named-method invocation on the host application object.
///
/// Implementations must not suspend: every command is an accessor or
/// mutator that completes promptly on the caller's thread.
pub trait HostCommandPort: Send + Sync {
    fn invoke(&self, command: &str, args: &[Value]) -> Result<Value, HostRejection>;
}

#[cfg(test)]
mockall::mock! {
    pub Host {}

    impl HostCommandPort for Host {
        fn invoke(&self, command: &str, args: &[Value]) -> Result<Value, HostRejection>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejection_displays_host_message_verbatim() {
        let err = HostRejection::new("path 'foo' is not supported");
        assert_eq!(err.to_string(), "path 'foo' is not supported");
    }

    #[test]
    fn mock_host_can_stand_in_for_port() {
        let mut host = MockHost::new();
        host.expect_invoke()
            .withf(|command, args| command == "getName" && args.is_empty())
            .times(1)
            .returning(|_, _| Ok(json!("demo")));

        let port: &dyn HostCommandPort = &host;
        assert_eq!(port.invoke("getName", &[]).unwrap(), json!("demo"));
    }
}
