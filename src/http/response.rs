//! The mutable-during-handling `Response` type.

use crate::http::headers::Headers;
use crate::http::status::StatusCode;
use crate::http::version::Version;

/// An HTTP response under construction by a handler, then serialized
/// by the Reactor. Mutable during handler execution, read-only after,
/// enforced here by convention rather than the type system: a plain
/// mutable builder the protocol state machine owns until it hands the
/// bytes to the socket.
#[derive(Clone, Debug)]
pub struct Response {
    version: Version,
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Response {
        Response { version: Version::Http11, status, headers: Headers::new(), body: Vec::new() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Response {
        self.headers.set(name, value);
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Response {
        self.body = body.into();
        self
    }

    /// Convenience constructor for a plain-text body with an explicit
    /// `Content-Length`. The core never auto-inserts this header, so
    /// handlers that want it call this or set it themselves.
    pub fn text(status: StatusCode, body: impl Into<Vec<u8>>) -> Response {
        let body = body.into();
        Response::new(status).header("Content-Length", body.len().to_string()).with_body(body)
    }

    /// Always `false`: this core closes every connection after one
    /// exchange, so a response is never eligible for keep-alive
    /// regardless of what a handler sets on it.
    pub fn is_keep_alive(&self) -> bool {
        false
    }
}

impl Default for Response {
    fn default() -> Response {
        Response::new(StatusCode::OK)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn text_sets_content_length() {
        let resp = Response::text(StatusCode::OK, "hi");
        assert_eq!(resp.headers().get("Content-Length"), Some("2"));
        assert_eq!(resp.body(), b"hi");
    }

    #[test]
    fn header_builder_chains() {
        let resp = Response::new(StatusCode::NOT_FOUND)
            .header("X-A", "1")
            .header("X-B", "2");
        assert_eq!(resp.headers().get("X-A"), Some("1"));
        assert_eq!(resp.headers().get("X-B"), Some("2"));
    }

    #[test]
    fn is_keep_alive_always_false() {
        let resp = Response::text(StatusCode::OK, "hi").header("Connection", "keep-alive");
        assert!(!resp.is_keep_alive());
    }
}
