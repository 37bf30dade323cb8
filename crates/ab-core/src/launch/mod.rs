//! Launch attempts: the argv / working-directory snapshot of one process start.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::LaunchId;

/// Snapshot of one process start.
///
/// Produced once per launch and never mutated afterwards. A secondary launch
/// forwards this value to the primary instance unchanged, argv order included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchAttempt {
    pub launch_id: LaunchId,
    pub argv: Vec<String>,
    pub working_directory: String,
    pub launched_at: DateTime<Utc>,
}

impl LaunchAttempt {
    pub fn new(argv: Vec<String>, working_directory: impl Into<String>) -> Self {
        Self {
            launch_id: LaunchId::new(),
            argv,
            working_directory: working_directory.into(),
            launched_at: Utc::now(),
        }
    }

    /// Capture the current process' argv and working directory.
    ///
    /// Non UTF-8 arguments are converted lossily; an unreadable working
    /// directory is recorded as an empty string.
    pub fn capture() -> Self {
        let argv = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let working_directory = std::env::current_dir()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(argv, working_directory)
    }

    pub fn working_directory_path(&self) -> PathBuf {
        PathBuf::from(&self.working_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_records_current_process() {
        let attempt = LaunchAttempt::capture();
        assert!(!attempt.argv.is_empty());
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(attempt.working_directory_path(), cwd);
    }

    #[test]
    fn json_shape_preserves_argv_order() {
        let attempt = LaunchAttempt::new(
            vec!["app".to_string(), "--b".to_string(), "--a".to_string()],
            "/tmp",
        );
        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["argv"], serde_json::json!(["app", "--b", "--a"]));
        assert_eq!(json["working_directory"], "/tmp");

        let back: LaunchAttempt = serde_json::from_value(json).unwrap();
        assert_eq!(back, attempt);
    }
}
