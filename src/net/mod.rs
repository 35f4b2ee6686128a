//! Platform networking primitives: the readiness `Poller` and the
//! `Listener` that owns the bound listening socket.

pub mod listener;
pub mod poller;

#[cfg(target_os = "linux")]
mod poller_epoll;

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
mod poller_kqueue;

pub use listener::Listener;
pub use poller::{Interest, Poller, PlatformPoller, Readiness, MAX_EVENTS};
