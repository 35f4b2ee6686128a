//! Fleet of N Reactors, assigning new descriptors to one by round-robin.

use std::os::fd::RawFd;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ServeError;
use crate::reactor::ReactorHandle;
use crate::router::Router;

pub struct Dispatcher {
    reactors: Vec<ReactorHandle>,
    next_index: AtomicUsize,
}

impl Dispatcher {
    /// Start `num_reactors` Reactors (at least one), all sharing the
    /// same read-only Router and config.
    pub fn start(num_reactors: usize, router: Arc<Router>, config: Arc<ServerConfig>) -> Result<Dispatcher, ServeError> {
        let count = num_reactors.max(1);
        let mut reactors = Vec::with_capacity(count);
        for _ in 0..count {
            reactors.push(ReactorHandle::start(router.clone(), config.clone())?);
        }
        Ok(Dispatcher { reactors, next_index: AtomicUsize::new(0) })
    }

    /// Select a Reactor by `next_index mod len` and hand off admission
    /// to it. The index advances with an `AtomicUsize::fetch_add`
    /// instead of a mutex-guarded counter, giving each accepted
    /// descriptor a distinct, monotonically increasing slot without a
    /// lock on the accept thread's hot path.
    pub fn register_client(&self, fd: RawFd) {
        let index = self.next_index.fetch_add(1, Ordering::SeqCst) % self.reactors.len();
        self.reactors[index].admit(fd);
    }

    /// Fan `stop` out to every Reactor.
    pub fn stop(&self) {
        for reactor in &self.reactors {
            reactor.stop();
        }
    }
}
