//! The pattern-matching router.

mod route;

pub use route::{Pattern, Route};

use crate::error::RouteError;
use crate::handler::SharedHandler;
use crate::http::{Method, Request};
use crate::middleware::SharedMiddleware;

/// Ordered sequence of `Route`s. First-match-wins on insertion order
/// within the subset matching the method.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

/// Result of a successful lookup: the handler to run and the middleware
/// chain to run before it. Path parameters are written directly onto
/// the `Request` passed to `find_route`.
pub struct Matched<'a> {
    pub handler: SharedHandler,
    pub middleware: &'a [SharedMiddleware],
}

impl Router {
    pub fn new() -> Router {
        Router { routes: Vec::new() }
    }

    /// Append a literal/parametric route.
    pub fn add_route(
        &mut self,
        pattern: impl Into<String>,
        method: Method,
        handler: SharedHandler,
        middleware: Vec<SharedMiddleware>,
    ) {
        self.routes.push(Route::literal(pattern, method, handler, middleware));
    }

    /// Append a regex route: `param_keys[i - 1]` receives capture group
    /// `i` (1-based), for every in-range `i`. The pattern is compiled
    /// once, here, rather than on every lookup; a malformed pattern is
    /// reported back to the caller instead of registering a route that
    /// can never match.
    pub fn add_regex_route(
        &mut self,
        pattern: impl Into<String>,
        method: Method,
        handler: SharedHandler,
        middleware: Vec<SharedMiddleware>,
        param_keys: Vec<String>,
    ) -> Result<(), RouteError> {
        self.routes.push(Route::regex(pattern, method, handler, middleware, param_keys)?);
        Ok(())
    }

    /// Append each given route with `prefix` prepended to its pattern
    /// and `middleware` appended after that route's own middleware
    /// (per-route middleware runs before group middleware, since both
    /// are list entries and execution is list order). Regex routes are
    /// recompiled once here, against the prefixed pattern.
    pub fn add_group(&mut self, prefix: &str, routes: Vec<Route>, middleware: Vec<SharedMiddleware>) -> Result<(), RouteError> {
        for mut route in routes {
            route.pattern = match route.pattern {
                Pattern::Segments(p) => Pattern::Segments(format!("{}{}", prefix, p)),
                Pattern::Regex(raw, _) => {
                    let prefixed = format!("{}{}", prefix, raw);
                    let compiled = route::compile(&prefixed)?;
                    Pattern::Regex(prefixed, compiled)
                }
            };
            route.middleware.extend(middleware.iter().cloned());
            self.routes.push(route);
        }
        Ok(())
    }

    /// Appends the five conventional REST routes in a fixed order:
    /// `GET name`, `POST name`, `GET name/:id`, `PUT name/:id`,
    /// `DELETE name/:id`.
    pub fn add_resource(&mut self, name: &str, handler: SharedHandler, middleware: Vec<SharedMiddleware>) {
        let base = format!("/{}", name);
        let item = format!("/{}/:id", name);
        self.add_route(&base, Method::Get, handler.clone(), middleware.clone());
        self.add_route(&base, Method::Post, handler.clone(), middleware.clone());
        self.add_route(&item, Method::Get, handler.clone(), middleware.clone());
        self.add_route(&item, Method::Put, handler.clone(), middleware.clone());
        self.add_route(&item, Method::Delete, handler, middleware);
    }

    /// Scan routes in insertion order, skip routes whose method doesn't
    /// match, try each candidate's pattern. On the first match, path
    /// parameters are written onto `request` and the handler/middleware
    /// are returned.
    pub fn find_route<'a>(&'a self, request: &mut Request) -> Option<Matched<'a>> {
        let method = request.method();
        let path = request.path().to_string();
        for route in &self.routes {
            if route.method != method {
                continue;
            }
            match &route.pattern {
                Pattern::Regex(_, re) => {
                    if let Some(caps) = re.captures(&path) {
                        for (i, key) in route.param_keys.iter().enumerate() {
                            if let Some(m) = caps.get(i + 1) {
                                request.set_param(key.clone(), m.as_str());
                            }
                        }
                        return Some(Matched { handler: route.handler.clone(), middleware: &route.middleware });
                    }
                }
                Pattern::Segments(pattern) => {
                    if let Some(params) = match_segments(pattern, &path) {
                        for (key, value) in params {
                            request.set_param(key, value);
                        }
                        return Some(Matched { handler: route.handler.clone(), middleware: &route.middleware });
                    }
                }
            }
        }
        None
    }
}

/// Split both sides on `/` into non-empty segments, compare
/// pairwise: `:name` binds, anything else must match byte-for-byte.
fn match_segments(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }
    let mut params = Vec::new();
    for (p, s) in pattern_segments.iter().zip(path_segments.iter()) {
        if let Some(name) = p.strip_prefix(':') {
            params.push((name.to_string(), s.to_string()));
        } else if p != s {
            return None;
        }
    }
    Some(params)
}
