//! Error taxonomy for the core.
//!
//! Parse and URL errors never escape a `Connection` (the Reactor turns
//! them into a 400 response and moves on). `ServeError` is the only
//! error type that crosses the embedder boundary, from `Server::run`.

use std::io;

use quick_error::quick_error;

quick_error! {
    /// Failure while parsing a request URL / request target.
    #[derive(Debug)]
    pub enum UrlError {
        Empty {
            display("empty URL")
        }
        MalformedIpv6 {
            display("malformed IPv6 literal: missing closing ']'")
        }
        InvalidPort(raw: String) {
            display("invalid port {:?}: must be a decimal integer 0..=65535", raw)
        }
    }
}

quick_error! {
    /// Failure while parsing an HTTP/1.x request.
    #[derive(Debug)]
    pub enum ParseError {
        MalformedStartLine {
            display("malformed request line")
        }
        UnknownMethod(raw: String) {
            display("unknown method {:?}", raw)
        }
        UnknownVersion(raw: String) {
            display("unknown HTTP version {:?}", raw)
        }
        BadUrl(err: UrlError) {
            from()
            display("bad request target: {}", err)
        }
        MalformedContentLength {
            display("Content-Length header is not a base-10 integer")
        }
        MalformedHeaderLine {
            display("header line missing ': ' separator")
        }
    }
}

quick_error! {
    /// Failure compiling a regex route pattern at registration time.
    #[derive(Debug)]
    pub enum RouteError {
        InvalidPattern(pattern: String, err: regex::Error) {
            display("invalid route pattern {:?}: {}", pattern, err)
        }
    }
}

quick_error! {
    /// Fatal failure starting or running the listening side of a server.
    #[derive(Debug)]
    pub enum ServeError {
        Bind(addr: String, err: io::Error) {
            display("failed to bind {}: {}", addr, err)
        }
        Listen(err: io::Error) {
            display("failed to listen: {}", err)
        }
        Socket(err: io::Error) {
            display("failed to create socket: {}", err)
        }
        Poller(err: io::Error) {
            display("failed to create poller: {}", err)
        }
        InvalidHost(raw: String) {
            display("invalid host {:?}: expected a dotted-quad IPv4 literal \
                      or \"0.0.0.0\"/empty for any address", raw)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_error_display() {
        let e: ParseError = UrlError::Empty.into();
        assert_eq!(format!("{}", e), "bad request target: empty URL");
    }

    #[test]
    fn serve_error_display() {
        let e = ServeError::InvalidHost("example.com".into());
        assert!(format!("{}", e).contains("example.com"));
    }
}
