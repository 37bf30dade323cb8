mod id_macro;
mod launch_id;
mod listener_id;

pub use launch_id::LaunchId;
pub use listener_id::ListenerId;
