//! Middleware: an ordered list of side-effectful callables invoked
//! before the handler.
//!
//! Middleware has no return value and cannot short-circuit the request
//! in this version. Letting it return an early `Response` would be a
//! natural strengthening, but that's left as a documented extension
//! point rather than implemented, so existing observable behavior
//! doesn't change underfoot.

use std::sync::Arc;

use crate::http::Request;

/// A middleware function: given mutable access to the request (headers,
/// extracted path parameters), perform a side effect. Cannot abort
/// the request.
pub trait Middleware: Send + Sync {
    fn call(&self, request: &mut Request);
}

pub type SharedMiddleware = Arc<dyn Middleware>;

impl<F> Middleware for F
where
    F: Fn(&mut Request) + Send + Sync,
{
    fn call(&self, request: &mut Request) {
        (self)(request)
    }
}

/// Run a chain of middleware over a request, in list order.
pub fn run_chain(chain: &[SharedMiddleware], request: &mut Request) {
    for mw in chain {
        mw.call(request);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::{Headers, Method, Url, Version};

    #[test]
    fn chain_runs_in_list_order() {
        let chain: Vec<SharedMiddleware> = vec![
            Arc::new(|req: &mut Request| req.headers_mut().set("X-Trace", "1")),
            Arc::new(|req: &mut Request| {
                let prior = req.headers().get("X-Trace").unwrap_or("").to_string();
                req.headers_mut().set("X-Trace", format!("{}-2", prior));
            }),
        ];
        let mut req = Request::new(Method::Get, Url::parse("/").unwrap(), Version::Http11, Headers::new(), Vec::new());
        run_chain(&chain, &mut req);
        assert_eq!(req.headers().get("X-Trace"), Some("1-2"));
    }
}
