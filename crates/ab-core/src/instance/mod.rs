//! Single-instance identity and roles.

mod identity;
mod role;

pub use identity::InstanceIdentity;
pub use role::InstanceRole;
