//! Single-instance coordination.
//!
//! One process per instance identity holds the exclusivity token and becomes
//! the primary instance. Every later launch forwards its argv and working
//! directory to the primary and is told to quit.

mod coordinator;
mod error;

pub use coordinator::{ForwardCallback, SingleInstanceCoordinator};
pub use error::CoordinatorError;
