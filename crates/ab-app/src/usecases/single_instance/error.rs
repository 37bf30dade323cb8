use ab_core::ports::ExclusivityError;
use ab_core::InstanceRole;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// `release` is only valid for the primary instance.
    #[error("cannot release single instance while {role}")]
    NotPrimary { role: InstanceRole },

    #[error("single instance registration already in progress")]
    RegistrationInProgress,

    #[error(transparent)]
    Exclusivity(#[from] ExclusivityError),
}
