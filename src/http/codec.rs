//! HTTP/1 request framing, parsing, and response serialization.
//!
//! Headers are split on the first `": "` per line rather than run
//! through a general-purpose parser like `httparse`, because the
//! framing rules here (especially the malformed-`Content-Length`
//! handling) are more particular than a generic parser models.

use crate::error::ParseError;
use crate::http::headers::Headers;
use crate::http::method::Method;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::url::Url;
use crate::http::version::Version;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Evaluate request framing over the inbound buffer: is there a
/// complete request sitting at the front of `buf`?
///
/// Monotonic by construction: it only asks "is the terminator present,
/// and if so are there enough bytes after it", both of which stay true
/// as more bytes are appended.
pub fn is_request_ready(buf: &[u8]) -> bool {
    let Some(header_end) = find_subslice(buf, HEADER_TERMINATOR) else {
        return false;
    };
    let body_start = header_end + HEADER_TERMINATOR.len();
    match parse_content_length(&buf[..header_end]) {
        None => true,
        Some(Err(())) => true, // malformed Content-Length: ready now, fails at parse step
        Some(Ok(needed)) => (buf.len() - body_start) as u64 >= needed,
    }
}

fn parse_content_length(head: &[u8]) -> Option<Result<u64, ()>> {
    let head = std::str::from_utf8(head).ok()?;
    for line in head.split("\r\n").skip(1) {
        if let Some(value) = case_insensitive_strip_prefix(line, "content-length:") {
            return Some(value.trim().parse::<u64>().map_err(|_| ()));
        }
    }
    None
}

fn case_insensitive_strip_prefix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if line.len() < prefix.len() {
        return None;
    }
    if line[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parse one complete, framed request out of `buf`. Returns the request
/// and the number of bytes consumed from `buf` (header + body, never
/// including trailing bytes of a second request).
pub fn parse_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let header_end = find_subslice(buf, HEADER_TERMINATOR).ok_or(ParseError::MalformedStartLine)?;
    let body_start = header_end + HEADER_TERMINATOR.len();

    let head = std::str::from_utf8(&buf[..header_end]).map_err(|_| ParseError::MalformedStartLine)?;
    let mut lines = head.split("\r\n");
    let start_line = lines.next().ok_or(ParseError::MalformedStartLine)?;

    let mut parts = start_line.split_ascii_whitespace();
    let method_tok = parts.next().ok_or(ParseError::MalformedStartLine)?;
    let target = parts.next().ok_or(ParseError::MalformedStartLine)?;
    let version_tok = parts.next().ok_or(ParseError::MalformedStartLine)?;
    if parts.next().is_some() {
        return Err(ParseError::MalformedStartLine);
    }

    let method = Method::parse(method_tok).ok_or_else(|| ParseError::UnknownMethod(method_tok.to_string()))?;
    let version = Version::parse(version_tok).ok_or_else(|| ParseError::UnknownVersion(version_tok.to_string()))?;
    let url = Url::parse(target)?;

    let mut headers = Headers::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(": ").ok_or(ParseError::MalformedHeaderLine)?;
        let value = value.strip_suffix('\r').unwrap_or(value);
        headers.append(name, value);
    }

    let content_length = match headers.content_length() {
        None => 0,
        Some(Ok(n)) => n,
        Some(Err(())) => return Err(ParseError::MalformedContentLength),
    };

    let body_end = body_start + content_length as usize;
    if body_end > buf.len() {
        // Framing should have prevented this, but guard anyway.
        return Err(ParseError::MalformedContentLength);
    }
    let body = buf[body_start..body_end].to_vec();

    Ok((Request::new(method, url, version, headers, body), body_end))
}

/// Serialize a response per §4.1: status line, headers in insertion
/// order, blank line, body verbatim. `Connection: close` is always
/// appended, signaling the single-exchange semantics of this core.
pub fn serialize_response(response: &Response) -> Vec<u8> {
    let mut out = Vec::with_capacity(128 + response.body().len());
    out.extend_from_slice(
        format!("{} {}\r\n", response.version(), response.status()).as_bytes(),
    );
    for (name, value) in response.headers().iter() {
        out.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
    }
    out.extend_from_slice(b"Connection: close\r\n");
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(response.body());
    out
}
