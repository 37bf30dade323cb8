use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppDirsError {
    #[error("system data-local directory unavailable")]
    DataLocalDirUnavailable,

    #[error("system cache directory unavailable")]
    CacheDirUnavailable,
}

/// Failures of the exclusivity primitive itself.
///
/// A conflict with another instance is not an error; it is the
/// [`Acquisition::Conflict`](super::Acquisition::Conflict) branch.
#[derive(Debug, Error)]
pub enum ExclusivityError {
    #[error("failed to prepare runtime directory {path}: {source}")]
    RuntimeDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to lock {path}: {source}")]
    Lock {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind forwarding channel: {0}")]
    Bind(#[source] std::io::Error),

    #[error("primary instance unreachable: {0}")]
    Unreachable(String),

    #[error("failed to forward launch attempt: {0}")]
    Forward(String),

    #[error("failed to release exclusivity: {0}")]
    Release(String),
}
