//! A thread-safe, append-only byte accumulator.
//!
//! One `Buffer` backs each direction of a `Connection`: inbound bytes are
//! appended as they arrive off the socket, outbound bytes are appended by
//! the codec and drained as they're written. The lock exists so a
//! `Connection` *could* be inspected from a thread other than its owning
//! Reactor (diagnostics, tests); the normal single-reactor-thread design
//! never contends on it.

use std::sync::Mutex;

/// Append-only byte container, internally synchronized.
#[derive(Default)]
pub struct Buffer {
    inner: Mutex<Vec<u8>>,
}

impl Buffer {
    pub fn new() -> Buffer {
        Buffer { inner: Mutex::new(Vec::new()) }
    }

    /// Append bytes to the end of the buffer.
    pub fn append(&self, bytes: &[u8]) {
        self.inner.lock().unwrap().extend_from_slice(bytes);
    }

    /// A read-only snapshot of everything appended so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.lock().unwrap().clone()
    }

    /// Drop the first `n` bytes, keeping the rest. Used after a partial
    /// write advances the outbound buffer, or after a complete request is
    /// consumed out of the inbound one.
    pub fn consume(&self, n: usize) {
        let mut guard = self.inner.lock().unwrap();
        if n >= guard.len() {
            guard.clear();
        } else {
            guard.drain(0..n);
        }
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    pub fn size(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

#[cfg(test)]
mod test {
    use super::Buffer;

    #[test]
    fn append_and_snapshot() {
        let buf = Buffer::new();
        buf.append(b"hello ");
        buf.append(b"world");
        assert_eq!(buf.snapshot(), b"hello world");
        assert_eq!(buf.size(), 11);
    }

    #[test]
    fn consume_partial_and_full() {
        let buf = Buffer::new();
        buf.append(b"0123456789");
        buf.consume(4);
        assert_eq!(buf.snapshot(), b"456789");
        buf.consume(100);
        assert!(buf.is_empty());
    }

    #[test]
    fn clear_empties_buffer() {
        let buf = Buffer::new();
        buf.append(b"data");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.size(), 0);
    }
}
