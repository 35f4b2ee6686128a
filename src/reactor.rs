//! Single-threaded event loop owning a Poller and a set of Connections.

use std::collections::HashMap;
use std::io;
use std::os::fd::RawFd;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::config::ServerConfig;
use crate::connection::{Connection, Phase, WriteOutcome};
use crate::error::ServeError;
use crate::http::{codec, Response, StatusCode};
use crate::middleware;
use crate::net::poller::{Interest, PlatformPoller, Poller, Readiness};
use crate::router::Router;

/// Owns one Poller, one descriptor→Connection map, and the flag that
/// cancels its loop. A single OS thread drives it.
struct Reactor {
    poller: Box<dyn Poller>,
    connections: HashMap<RawFd, Connection>,
    router: Arc<Router>,
    config: Arc<ServerConfig>,
    admissions: Receiver<RawFd>,
    running: Arc<AtomicBool>,
}

impl Reactor {
    fn run(mut self) {
        while self.running.load(Ordering::Acquire) {
            self.drain_admissions();

            let events = match self.poller.poll(self.config.poll_timeout_ms) {
                Ok(events) => events,
                Err(err) => {
                    log::warn!("reactor poll failed: {}", err);
                    Vec::new()
                }
            };

            for event in events {
                // Never let a component-level failure escape the loop:
                // log it and drop the one connection it concerns.
                if let Err(err) = self.handle_event(event) {
                    log::warn!("dropping connection fd={} after I/O error: {}", event.fd, err);
                    self.drop_connection(event.fd);
                }
            }
        }

        for fd in self.connections.keys().copied().collect::<Vec<_>>() {
            self.drop_connection(fd);
        }
    }

    /// Drain descriptors admitted by the Dispatcher from any thread.
    /// Registering them with the Poller happens here, on the Reactor's
    /// own thread, at the top of each iteration.
    fn drain_admissions(&mut self) {
        while let Ok(fd) = self.admissions.try_recv() {
            if let Err(err) = self.poller.add(fd, Interest::read_edge_triggered()) {
                log::warn!("failed to register admitted fd={}: {}", fd, err);
                unsafe { libc::close(fd) };
                continue;
            }
            self.connections.insert(fd, Connection::new(fd));
        }
    }

    fn handle_event(&mut self, event: Readiness) -> io::Result<()> {
        if !self.connections.contains_key(&event.fd) {
            // Event for an fd we've already dropped; ignore.
            return Ok(());
        }
        if event.error_or_hangup {
            self.drop_connection(event.fd);
            return Ok(());
        }
        if event.readable {
            self.handle_readable(event.fd)?;
        }
        if event.writable {
            self.handle_writable(event.fd)?;
        }
        Ok(())
    }

    fn handle_readable(&mut self, fd: RawFd) -> io::Result<()> {
        let phase = match self.connections.get(&fd) {
            Some(conn) => conn.phase(),
            None => return Ok(()),
        };
        if phase != Phase::ReadingRequest {
            return Ok(());
        }

        let chunk_size = self.config.read_chunk_size;
        let n = {
            let conn = self.connections.get(&fd).expect("fd still present");
            conn.read_once(chunk_size)?
        };
        if n == 0 {
            self.drop_connection(fd);
            return Ok(());
        }

        let ready = {
            let conn = self.connections.get(&fd).expect("fd still present");
            conn.is_request_ready()
        };
        if ready {
            let request_bytes = {
                let conn = self.connections.get(&fd).expect("fd still present");
                conn.inbound_snapshot()
            };
            let response = dispatch(&self.router, &request_bytes);

            let conn = self.connections.get_mut(&fd).expect("fd still present");
            conn.set_phase(Phase::Processing);
            conn.set_phase(Phase::WritingResponse);
            conn.prepare_response(&response);
            self.try_write(fd)?;
        }
        Ok(())
    }

    fn handle_writable(&mut self, fd: RawFd) -> io::Result<()> {
        let phase = match self.connections.get(&fd) {
            Some(conn) => conn.phase(),
            None => return Ok(()),
        };
        if phase != Phase::WritingResponse {
            return Ok(());
        }
        self.try_write(fd)
    }

    /// Write what we can. On a complete drain the single-exchange
    /// lifetime is over and the Connection is dropped. On a partial
    /// write, re-register for WRITE readiness instead of giving up, so
    /// a response exceeding the socket send buffer still goes out
    /// whole across repeated calls.
    fn try_write(&mut self, fd: RawFd) -> io::Result<()> {
        let outcome = {
            let conn = self.connections.get(&fd).expect("fd still present");
            conn.write_once()?
        };
        match outcome {
            WriteOutcome::Complete => self.drop_connection(fd),
            WriteOutcome::Partial | WriteOutcome::WouldBlock => {
                self.poller.modify(fd, Interest::read_edge_triggered().with_write(true))?;
            }
        }
        Ok(())
    }

    fn drop_connection(&mut self, fd: RawFd) {
        let _ = self.poller.remove(fd);
        self.connections.remove(fd);
    }
}

/// Parse, route, run middleware, invoke the handler, and produce the
/// Response. Never panics past this point: a handler panic is caught
/// and turned into a 500.
fn dispatch(router: &Router, request_bytes: &[u8]) -> Response {
    let (mut request, _consumed) = match codec::parse_request(request_bytes) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("parse failure: {}", err);
            return Response::text(StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    let Some(matched) = router.find_route(&mut request) else {
        return Response::text(StatusCode::NOT_FOUND, "Not Found");
    };

    middleware::run_chain(matched.middleware, &mut request);
    let handler = matched.handler.clone();

    match panic::catch_unwind(AssertUnwindSafe(move || handler.handle(request))) {
        Ok(response) => response,
        Err(_) => {
            log::error!("handler panicked");
            Response::text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// A handle to a running Reactor, held by the Dispatcher. Cloneable
/// access points (`admit`, `stop`) work from any thread; the Reactor
/// itself runs exclusively on its own OS thread.
pub struct ReactorHandle {
    admissions: Sender<RawFd>,
    running: Arc<AtomicBool>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl ReactorHandle {
    pub fn start(router: Arc<Router>, config: Arc<ServerConfig>) -> Result<ReactorHandle, ServeError> {
        let poller = PlatformPoller::new().map_err(ServeError::Poller)?;
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));

        let reactor = Reactor {
            poller: Box::new(poller),
            connections: HashMap::new(),
            router,
            config,
            admissions: rx,
            running: running.clone(),
        };

        let join = thread::Builder::new()
            .name("reactor-http-reactor".into())
            .spawn(move || reactor.run())
            .expect("failed to spawn reactor thread");

        Ok(ReactorHandle { admissions: tx, running, join: Mutex::new(Some(join)) })
    }

    /// Admit a newly accepted descriptor. Safe to call from any thread:
    /// the fd is queued and registered with the Poller from the
    /// Reactor's own thread on its next loop iteration.
    pub fn admit(&self, fd: RawFd) {
        if self.admissions.send(fd).is_err() {
            log::warn!("reactor is shut down; closing admitted fd={}", fd);
            unsafe { libc::close(fd) };
        }
    }

    /// Flip the running flag and join the Reactor thread. Cancellation
    /// takes effect within one poll timeout.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(join) = self.join.lock().unwrap().take() {
            let _ = join.join();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::SharedHandler;
    use crate::http::{Method, Request};

    fn ok_handler() -> SharedHandler {
        Arc::new(|_req: Request| Response::text(StatusCode::OK, "hi"))
    }

    #[test]
    fn dispatch_runs_matched_handler() {
        let mut router = Router::new();
        router.add_route("/", Method::Get, ok_handler(), Vec::new());
        let response = dispatch(&router, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), b"hi");
    }

    #[test]
    fn dispatch_returns_404_for_unmatched_route() {
        let router = Router::new();
        let response = dispatch(&router, b"GET /missing HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), b"Not Found");
    }

    #[test]
    fn dispatch_returns_400_for_malformed_request() {
        let router = Router::new();
        let response = dispatch(&router, b"BOGUS\r\n\r\n");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), b"Bad Request");
    }

    #[test]
    fn dispatch_returns_500_when_handler_panics() {
        let mut router = Router::new();
        let handler: SharedHandler = Arc::new(|_req: Request| panic!("boom"));
        router.add_route("/", Method::Get, handler, Vec::new());
        let response = dispatch(&router, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), b"Internal Server Error");
    }
}
