//! A minimal, embeddable HTTP/1 server core: a multi-reactor event loop
//! over a hand-rolled epoll/kqueue poller, non-blocking connections, and
//! a pattern-matching router with middleware.
//!
//! The crate's only contract with the embedding application is the
//! [`Handler`] trait plus the [`Server`] builder methods; everything
//! else (logging configuration, signal handling, the CLI entry point)
//! is the embedder's concern.
//!
//! Non-goals: persistent (keep-alive) connections beyond one exchange,
//! HTTP/2 or HTTP/3, TLS termination, chunked transfer-encoding,
//! streaming bodies, WebSocket upgrade, request pipelining, and
//! graceful in-flight draining beyond closing the listener.

pub mod buffer;
pub mod config;
mod connection;
mod dispatcher;
pub mod error;
pub mod handler;
pub mod http;
pub mod middleware;
mod net;
mod reactor;
pub mod router;
mod server;

pub use config::ServerConfig;
pub use error::{ParseError, RouteError, ServeError, UrlError};
pub use handler::{Handler, SharedHandler};
pub use http::{Headers, Method, Request, Response, StatusCode, Url, Version};
pub use middleware::{Middleware, SharedMiddleware};
pub use router::{Route, Router};
pub use server::Server;
