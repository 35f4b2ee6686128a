//! The immutable `Request` type.

use crate::http::headers::Headers;
use crate::http::method::Method;
use crate::http::url::Url;
use crate::http::version::Version;

/// A parsed HTTP request. Immutable after construction: the Reactor
/// builds it, a Handler borrows or consumes it, and it's discarded when
/// the handler returns.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    url: Url,
    version: Version,
    headers: Headers,
    body: Vec<u8>,
    /// Path parameters extracted by the router (`:name` segments or
    /// regex capture groups). Populated by `Router::find_route` before
    /// the handler runs; mutable so middleware can add to it.
    params: Headers,
}

impl Request {
    pub fn new(method: Method, url: Url, version: Version, headers: Headers, body: Vec<u8>) -> Request {
        Request { method, url, version, headers, body, params: Headers::new() }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable header access, for middleware.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn path(&self) -> &str {
        &self.url.path
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.set(name, value);
    }

    /// `Content-Length`, if present and well-formed.
    pub fn content_length(&self) -> Option<Result<u64, ()>> {
        self.headers.content_length()
    }

    /// Number of headers carried by this request.
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Request {
        Request::new(
            Method::Get,
            Url::parse("/users/42").unwrap(),
            Version::Http11,
            Headers::new(),
            Vec::new(),
        )
    }

    #[test]
    fn params_roundtrip() {
        let mut req = sample();
        req.set_param("id", "42");
        assert_eq!(req.param("id"), Some("42"));
        assert_eq!(req.param("missing"), None);
    }

    #[test]
    fn path_delegates_to_url() {
        assert_eq!(sample().path(), "/users/42");
    }

    #[test]
    fn header_count_reflects_headers() {
        let mut headers = Headers::new();
        headers.set("Host", "x");
        headers.set("Accept", "*/*");
        let req = Request::new(Method::Get, Url::parse("/").unwrap(), Version::Http11, headers, Vec::new());
        assert_eq!(req.header_count(), 2);
    }
}
