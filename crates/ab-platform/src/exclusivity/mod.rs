//! Exclusivity primitives implementing [`ExclusivityPort`](ab_core::ports::ExclusivityPort).

pub mod frame;
mod in_process;
#[cfg(unix)]
mod local_socket;

pub use in_process::InProcessExclusivity;
#[cfg(unix)]
pub use local_socket::LocalSocketExclusivity;
