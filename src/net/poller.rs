//! Platform-abstracted readiness notifier.
//!
//! Hand-rolled over raw `epoll`/`kqueue` syscalls via `libc`, in the
//! spirit of what `rotor`/`mio` do underneath a `mio::EventLoop`,
//! except this crate owns the syscalls itself rather than depending on
//! `mio`.

use std::io;
use std::os::fd::RawFd;

/// The readiness conditions a descriptor can be registered for.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Interest {
    pub read: bool,
    pub write: bool,
    pub edge_triggered: bool,
}

impl Interest {
    pub fn read_edge_triggered() -> Interest {
        Interest { read: true, write: false, edge_triggered: true }
    }

    pub fn with_write(mut self, write: bool) -> Interest {
        self.write = write;
        self
    }
}

/// What happened on a descriptor, as reported by `poll`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Readiness {
    pub fd: RawFd,
    pub readable: bool,
    pub writable: bool,
    /// ERROR and HANGUP are always implicitly monitored and folded into
    /// this single flag: callers treat both the same way, by dropping
    /// the connection.
    pub error_or_hangup: bool,
}

/// Maximum events returned from a single `poll` call.
pub const MAX_EVENTS: usize = 64;

/// A readiness notifier over a set of file descriptors.
///
/// Implementations must make `remove` of an already-closed descriptor a
/// no-op rather than an error, and must surface an interrupted wait as
/// an empty `Vec`, not an `Err`.
pub trait Poller: Send {
    fn add(&self, fd: RawFd, interest: Interest) -> io::Result<()>;
    fn modify(&self, fd: RawFd, interest: Interest) -> io::Result<()>;
    fn remove(&self, fd: RawFd) -> io::Result<()>;
    /// Block up to `timeout_ms` (`-1` = indefinite) and return the
    /// ready descriptors, at most `MAX_EVENTS` of them.
    fn poll(&self, timeout_ms: i32) -> io::Result<Vec<Readiness>>;
}

#[cfg(all(target_os = "linux"))]
pub use crate::net::poller_epoll::EpollPoller as PlatformPoller;

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd", target_os = "dragonfly"))]
pub use crate::net::poller_kqueue::KqueuePoller as PlatformPoller;

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
compile_error!("reactor_http's Poller has no backend for this target; add one in src/net/poller.rs");
