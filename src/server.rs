//! Composes a Listener and a Dispatcher; runs the accept loop on its
//! own thread. This is the embedder-facing entry point.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{RouteError, ServeError};
use crate::handler::SharedHandler;
use crate::http::Method;
use crate::middleware::SharedMiddleware;
use crate::net::Listener;
use crate::router::{Route, Router};

/// The embeddable HTTP/1 server core.
///
/// Register routes with `add_route`/`add_regex_route`/`add_group`/
/// `add_resource`, then call `run`: it blocks the calling thread until
/// `stop` is invoked from another thread (or another signal source the
/// embedder wires up, e.g. a signal handler, which is out of scope
/// here).
pub struct Server {
    router: Mutex<Router>,
    config: ServerConfig,
    running: Arc<AtomicBool>,
    listener: Mutex<Option<Arc<Listener>>>,
    shutdown: Mutex<bool>,
    shutdown_cv: Condvar,
}

impl Server {
    pub fn new() -> Server {
        Server::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Server {
        Server {
            router: Mutex::new(Router::new()),
            config,
            running: Arc::new(AtomicBool::new(false)),
            listener: Mutex::new(None),
            shutdown: Mutex::new(false),
            shutdown_cv: Condvar::new(),
        }
    }

    /// `addRoute(pattern, method, handler, middleware=[])` in literal /
    /// `:name`-parametric mode.
    pub fn add_route(&self, pattern: &str, method: Method, handler: SharedHandler, middleware: Vec<SharedMiddleware>) {
        self.router.lock().unwrap().add_route(pattern, method, handler, middleware);
    }

    /// `addRoute(pattern, method, handler, middleware=[], isRegex=true, paramKeys=[])`.
    /// Fails if `pattern` doesn't compile as a regex; the route is never
    /// registered in that case.
    pub fn add_regex_route(
        &self,
        pattern: &str,
        method: Method,
        handler: SharedHandler,
        middleware: Vec<SharedMiddleware>,
        param_keys: Vec<String>,
    ) -> Result<(), RouteError> {
        self.router.lock().unwrap().add_regex_route(pattern, method, handler, middleware, param_keys)
    }

    /// `addGroup(prefix, routes, middleware=[])`. Fails if any regex
    /// route in `routes` fails to recompile once re-anchored behind
    /// `prefix`.
    pub fn add_group(&self, prefix: &str, routes: Vec<Route>, middleware: Vec<SharedMiddleware>) -> Result<(), RouteError> {
        self.router.lock().unwrap().add_group(prefix, routes, middleware)
    }

    /// `addResource(name, handler, middleware=[])`.
    pub fn add_resource(&self, name: &str, handler: SharedHandler, middleware: Vec<SharedMiddleware>) {
        self.router.lock().unwrap().add_resource(name, handler, middleware);
    }

    /// The address the listener is bound to, once `run` has started it.
    /// Useful for tests that bind an ephemeral port (`:0`).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().unwrap().as_ref().and_then(|l| l.local_addr().ok())
    }

    /// `run(host, port, numThreads=4)`: binds and listens, starts the
    /// Dispatcher's Reactors, launches the accept thread, and blocks
    /// the calling thread until `stop` is called.
    pub fn run(&self, host: &str, port: u16, num_threads: usize) -> Result<(), ServeError> {
        self.running.store(true, Ordering::SeqCst);
        *self.shutdown.lock().unwrap() = false;

        let listener = Arc::new(Listener::bind(host, port, self.config.backlog)?);
        *self.listener.lock().unwrap() = Some(listener.clone());

        // The Router becomes read-only for the rest of this run, taken
        // out of the builder Mutex and handed to the Reactors behind
        // an `Arc`.
        let router = Arc::new(std::mem::take(&mut *self.router.lock().unwrap()));
        let config = Arc::new(self.config.clone());
        let dispatcher = Arc::new(Dispatcher::start(num_threads, router, config)?);

        let accept_handle = {
            let running = self.running.clone();
            let listener = listener.clone();
            let dispatcher = dispatcher.clone();
            let backoff = Duration::from_millis(self.config.accept_backoff_ms);
            thread::Builder::new()
                .name("reactor-http-accept".into())
                .spawn(move || accept_loop(running, listener, dispatcher, backoff))
                .expect("failed to spawn accept thread")
        };

        // Block the calling ("application main") thread until `stop`
        // signals shutdown.
        {
            let mut shutdown = self.shutdown.lock().unwrap();
            while !*shutdown {
                shutdown = self.shutdown_cv.wait(shutdown).unwrap();
            }
        }

        let _ = accept_handle.join();
        dispatcher.stop();
        *self.listener.lock().unwrap() = None;
        Ok(())
    }

    /// Signals shutdown; idempotent. Safe to call before `run` (no-op)
    /// or more than once.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(listener) = self.listener.lock().unwrap().as_ref() {
            listener.shutdown();
        }
        *self.shutdown.lock().unwrap() = true;
        self.shutdown_cv.notify_all();
    }
}

impl Default for Server {
    fn default() -> Server {
        Server::new()
    }
}

/// The accept thread's loop: non-blocking accept; hand any accepted
/// descriptor to the Dispatcher; otherwise sleep briefly.
/// Accept errors other than would-block are logged, never fatal.
fn accept_loop(running: Arc<AtomicBool>, listener: Arc<Listener>, dispatcher: Arc<Dispatcher>, backoff: Duration) {
    while running.load(Ordering::Acquire) {
        match listener.accept() {
            Ok(Some((fd, addr))) => {
                log::debug!("accepted connection from {}", addr);
                dispatcher.register_client(fd);
            }
            Ok(None) => thread::sleep(backoff),
            Err(err) => {
                log::warn!("accept error: {}", err);
                thread::sleep(backoff);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stop_before_run_is_a_harmless_no_op() {
        let server = Server::new();
        server.stop();
        server.stop();
    }
}
