//! End-to-end wire-level scenarios: a real `Server` bound to an
//! ephemeral loopback port, driven with raw `TcpStream`s.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::thread;
use std::time::{Duration, Instant};

use reactor_http::{Handler, Method, Request, Response, Server, StatusCode};

static LOG_INIT: Once = Once::new();

fn init_logging() {
    LOG_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Boots `server` (already configured with routes) on a background
/// thread bound to an ephemeral loopback port, waits for it to start
/// listening, and returns the address plus a guard that stops it and
/// joins the thread on drop.
struct Running {
    addr: SocketAddr,
    server: Arc<Server>,
    join: Option<thread::JoinHandle<()>>,
}

impl Running {
    fn start(server: Server, num_reactors: usize) -> Running {
        init_logging();
        let server = Arc::new(server);
        let run_server = server.clone();
        let join = thread::spawn(move || {
            run_server.run("127.0.0.1", 0, num_reactors).expect("server run failed");
        });

        let deadline = Instant::now() + Duration::from_secs(2);
        let addr = loop {
            if let Some(addr) = server.local_addr() {
                break addr;
            }
            assert!(Instant::now() < deadline, "server never started listening");
            thread::sleep(Duration::from_millis(5));
        };

        Running { addr, server, join: Some(join) }
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.server.stop();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn send_and_read(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(request).unwrap();
    stream.shutdown(std::net::Shutdown::Write).ok();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    response
}

fn split_head_body(raw: &[u8]) -> (String, &[u8]) {
    let terminator = b"\r\n\r\n";
    let pos = raw.windows(4).position(|w| w == terminator).expect("no header terminator");
    (String::from_utf8_lossy(&raw[..pos]).into_owned(), &raw[pos + 4..])
}

struct FnHandler<F>(F);
impl<F: Fn(Request) -> Response + Send + Sync> Handler for FnHandler<F> {
    fn handle(&self, request: Request) -> Response {
        (self.0)(request)
    }
}

fn handler<F: Fn(Request) -> Response + Send + Sync + 'static>(f: F) -> Arc<dyn Handler> {
    Arc::new(FnHandler(f))
}

#[test]
fn exact_literal_route() {
    let server = Server::new();
    server.add_route("/", Method::Get, handler(|_| Response::text(StatusCode::OK, "hi")), Vec::new());
    let running = Running::start(server, 2);

    let raw = send_and_read(running.addr, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
    let (head, body) = split_head_body(&raw);
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains("Connection: close"));
    assert_eq!(body, b"hi");
}

#[test]
fn parametric_route() {
    let server = Server::new();
    server.add_route(
        "/users/:id",
        Method::Get,
        handler(|req| {
            let id = req.param("id").unwrap_or("").to_string();
            Response::text(StatusCode::OK, format!("user={}", id))
        }),
        Vec::new(),
    );
    let running = Running::start(server, 2);

    let raw = send_and_read(running.addr, b"GET /users/42 HTTP/1.1\r\nHost: x\r\n\r\n");
    let (head, body) = split_head_body(&raw);
    assert!(head.starts_with("HTTP/1.1 200"));
    assert_eq!(body, b"user=42");
}

#[test]
fn regex_route() {
    let server = Server::new();
    server.add_regex_route(
        "/search/(.*)",
        Method::Get,
        handler(|req| {
            let query = req.param("query").unwrap_or("").to_string();
            Response::text(StatusCode::OK, format!("query={}", query))
        }),
        Vec::new(),
        vec!["query".to_string()],
    )
    .unwrap();
    let running = Running::start(server, 2);

    let raw = send_and_read(running.addr, b"GET /search/abc HTTP/1.1\r\nHost: x\r\n\r\n");
    let (_, body) = split_head_body(&raw);
    assert_eq!(body, b"query=abc");
}

#[test]
fn grouped_routes_are_prefixed_and_ungrouped_paths_are_not_found() {
    use reactor_http::Route;

    let server = Server::new();
    let grouped = vec![Route::literal(
        "/status",
        Method::Get,
        handler(|_| Response::text(StatusCode::OK, "up")),
        Vec::new(),
    )];
    server.add_group("/api", grouped, Vec::new()).unwrap();
    let running = Running::start(server, 2);

    let raw = send_and_read(running.addr, b"GET /api/status HTTP/1.1\r\nHost: x\r\n\r\n");
    let (head, body) = split_head_body(&raw);
    assert!(head.starts_with("HTTP/1.1 200"));
    assert_eq!(body, b"up");

    let raw = send_and_read(running.addr, b"GET /status HTTP/1.1\r\nHost: x\r\n\r\n");
    let (head, _) = split_head_body(&raw);
    assert!(head.starts_with("HTTP/1.1 404"));
}

#[test]
fn resource_expansion() {
    let server = Server::new();
    server.add_resource(
        "items",
        handler(|req| {
            let id = req.param("id").unwrap_or("").to_string();
            Response::text(StatusCode::OK, format!("{}:{}", req.method(), id))
        }),
        Vec::new(),
    );
    let running = Running::start(server, 2);

    let cases: &[(&[u8], &[u8])] = &[
        (b"GET /items HTTP/1.1\r\nHost: x\r\n\r\n", b"GET:"),
        (b"POST /items HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\n\r\n", b"POST:"),
        (b"GET /items/7 HTTP/1.1\r\nHost: x\r\n\r\n", b"GET:7"),
        (b"PUT /items/7 HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\n\r\n", b"PUT:7"),
        (b"DELETE /items/7 HTTP/1.1\r\nHost: x\r\n\r\n", b"DELETE:7"),
    ];
    for (request, expected_body) in cases {
        let raw = send_and_read(running.addr, request);
        let (head, body) = split_head_body(&raw);
        assert!(head.starts_with("HTTP/1.1 200"), "unexpected head for {:?}: {}", request, head);
        assert_eq!(body, *expected_body);
    }

    let raw = send_and_read(running.addr, b"PATCH /items HTTP/1.1\r\nHost: x\r\n\r\n");
    let (head, _) = split_head_body(&raw);
    assert!(head.starts_with("HTTP/1.1 404"));
}

#[test]
fn malformed_request_is_400() {
    let server = Server::new();
    let running = Running::start(server, 1);

    let raw = send_and_read(running.addr, b"BOGUS\r\n\r\n");
    let (head, body) = split_head_body(&raw);
    assert!(head.starts_with("HTTP/1.1 400"));
    assert_eq!(body, b"Bad Request");
}

#[test]
fn body_framing_waits_for_content_length() {
    let server = Server::new();
    server.add_route(
        "/echo",
        Method::Post,
        handler(|req| Response::text(StatusCode::OK, req.body().to_vec())),
        Vec::new(),
    );
    let running = Running::start(server, 1);

    let mut stream = TcpStream::connect(running.addr).unwrap();
    stream.write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel").unwrap();
    thread::sleep(Duration::from_millis(50));
    stream.write_all(b"lo").unwrap();
    stream.shutdown(std::net::Shutdown::Write).ok();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    let (head, body) = split_head_body(&raw);
    assert!(head.starts_with("HTTP/1.1 200"));
    assert_eq!(body, b"hello");
}

#[test]
fn response_larger_than_socket_buffer_is_delivered_whole() {
    // Exercises the partial-write retry path: a body well past a
    // typical 64 KiB socket send buffer must still arrive intact.
    let big_body = vec![b'x'; 256 * 1024];
    let expected = big_body.clone();

    let server = Server::new();
    server.add_route(
        "/big",
        Method::Get,
        handler(move |_| Response::text(StatusCode::OK, big_body.clone())),
        Vec::new(),
    );
    let running = Running::start(server, 1);

    let raw = send_and_read(running.addr, b"GET /big HTTP/1.1\r\nHost: x\r\n\r\n");
    let (head, body) = split_head_body(&raw);
    assert!(head.starts_with("HTTP/1.1 200"));
    assert_eq!(body.len(), expected.len());
    assert_eq!(body, expected.as_slice());
}

#[test]
fn concurrent_clients_each_get_one_well_formed_response() {
    let server = Server::new();
    server.add_route("/", Method::Get, handler(|_| Response::text(StatusCode::OK, "ok")), Vec::new());
    let running = Running::start(server, 4);

    let failures = Arc::new(AtomicBool::new(false));
    let mut workers = Vec::new();
    for _ in 0..40 {
        let addr = running.addr;
        let failures = failures.clone();
        workers.push(thread::spawn(move || {
            let raw = send_and_read(addr, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
            let (head, body) = split_head_body(&raw);
            if !head.starts_with("HTTP/1.1 200") || body != b"ok" {
                failures.store(true, Ordering::SeqCst);
            }
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }
    assert!(!failures.load(Ordering::SeqCst));
}
