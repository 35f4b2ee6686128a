//! The boundary between the core and user code.
//!
//! `rotor-http` expresses this as `Server<C>: Sized`, a trait
//! implemented by a per-connection state machine threaded through by
//! `rotor`'s `Scope`. This core has no per-connection handler state
//! machine: a handler call is a single synchronous function of
//! `Request -> Response` run to completion on the Reactor thread, so
//! the trait collapses to one method, shared across Reactors by `Arc`
//! rather than rotor's generic `Scope`.

use std::sync::Arc;

use crate::http::{Request, Response};

/// A request handler. Handlers must be safe to invoke concurrently from
/// any Reactor thread; they are never mutated after registration.
pub trait Handler: Send + Sync {
    fn handle(&self, request: Request) -> Response;
}

/// Shared, reference-counted handle to a handler, as stored in a
/// `Route`. Many routes may point at the same handler.
pub type SharedHandler = Arc<dyn Handler>;

impl<F> Handler for F
where
    F: Fn(Request) -> Response + Send + Sync,
{
    fn handle(&self, request: Request) -> Response {
        (self)(request)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::StatusCode;

    #[test]
    fn closures_implement_handler() {
        let handler: SharedHandler = Arc::new(|_req: Request| Response::text(StatusCode::OK, "ok"));
        let req = crate::http::Request::new(
            crate::http::Method::Get,
            crate::http::Url::parse("/").unwrap(),
            crate::http::Version::Http11,
            crate::http::Headers::new(),
            Vec::new(),
        );
        let resp = handler.handle(req);
        assert_eq!(resp.body(), b"ok");
    }
}
