//! In-process host implementations of [`HostCommandPort`](ab_core::ports::HostCommandPort).

mod headless;

pub use headless::{
    host_message_channel, HeadlessHost, HostMessage, HostMessageReceiver, HostMessageSender,
};
