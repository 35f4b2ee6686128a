//! A single routing entry.

use regex::Regex;

use crate::error::RouteError;
use crate::handler::SharedHandler;
use crate::http::Method;
use crate::middleware::SharedMiddleware;

/// How a route's pattern is matched against an incoming path.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Literal or `:name`-parameterized path, e.g. `/users/:id`.
    Segments(String),
    /// A regular expression, matched against the whole path. Holds the
    /// raw pattern text alongside the compiled, anchored `Regex` so a
    /// route built for a group can be re-prefixed and recompiled once,
    /// at registration time, rather than on every lookup. Capture group
    /// `i` (1-based) maps to `param_keys[i - 1]`, when that index is in
    /// range; a capture without a declared key is silently dropped.
    Regex(String, Regex),
}

pub struct Route {
    pub pattern: Pattern,
    pub method: Method,
    pub handler: SharedHandler,
    pub middleware: Vec<SharedMiddleware>,
    pub param_keys: Vec<String>,
}

/// Anchor and compile a route pattern. Anchoring with `^(?:...)$` means
/// a route can never match a prefix or suffix of the path by accident.
pub fn compile(pattern: &str) -> Result<Regex, RouteError> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|err| RouteError::InvalidPattern(pattern.to_string(), err))
}

impl Route {
    pub fn literal(
        pattern: impl Into<String>,
        method: Method,
        handler: SharedHandler,
        middleware: Vec<SharedMiddleware>,
    ) -> Route {
        Route {
            pattern: Pattern::Segments(pattern.into()),
            method,
            handler,
            middleware,
            param_keys: Vec::new(),
        }
    }

    pub fn regex(
        pattern: impl Into<String>,
        method: Method,
        handler: SharedHandler,
        middleware: Vec<SharedMiddleware>,
        param_keys: Vec<String>,
    ) -> Result<Route, RouteError> {
        let pattern = pattern.into();
        let compiled = compile(&pattern)?;
        Ok(Route {
            pattern: Pattern::Regex(pattern, compiled),
            method,
            handler,
            middleware,
            param_keys,
        })
    }
}
