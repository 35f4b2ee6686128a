//! The HTTP request method.

use std::fmt;

/// An HTTP request method.
///
/// Only the nine tokens registered for HTTP/1.1 are recognized on input;
/// anything else is a parse failure (surfaced as 400 by the codec).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl Method {
    /// Parse a method token exactly as it appears on the wire.
    ///
    /// Matching is case-sensitive per RFC 9110 (methods are tokens, and
    /// registered tokens are uppercase).
    pub fn parse(raw: &str) -> Option<Method> {
        use Method::*;
        Some(match raw {
            "GET" => Get,
            "HEAD" => Head,
            "POST" => Post,
            "PUT" => Put,
            "DELETE" => Delete,
            "CONNECT" => Connect,
            "OPTIONS" => Options,
            "TRACE" => Trace,
            "PATCH" => Patch,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        use Method::*;
        match *self {
            Get => "GET",
            Head => "HEAD",
            Post => "POST",
            Put => "PUT",
            Delete => "DELETE",
            Connect => "CONNECT",
            Options => "OPTIONS",
            Trace => "TRACE",
            Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
