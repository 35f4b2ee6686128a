//! Per-client state: descriptor, in/out buffers, lifecycle phase.

use std::io;
use std::os::fd::RawFd;

use crate::buffer::Buffer;
use crate::http::codec;
use crate::http::Response;

/// A Connection's lifecycle phase, advanced exclusively by its owning
/// Reactor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    ReadingRequest,
    Processing,
    WritingResponse,
    Closed,
}

/// Result of one `write_once` attempt.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WriteOutcome {
    /// The outbound buffer is now empty; the exchange is complete.
    Complete,
    /// Some bytes went out but the buffer still has more: the buffer is
    /// advanced by the bytes actually written instead of being cleared
    /// unconditionally, so the remainder is retried on the next write.
    Partial,
    /// The socket send buffer is full; nothing was written this call.
    WouldBlock,
}

/// A Connection wraps an already-accepted, non-blocking descriptor. It
/// owns that descriptor exclusively and closes it exactly once, on
/// drop.
pub struct Connection {
    fd: RawFd,
    inbound: Buffer,
    outbound: Buffer,
    phase: Phase,
}

impl Connection {
    pub fn new(fd: RawFd) -> Connection {
        Connection { fd, inbound: Buffer::new(), outbound: Buffer::new(), phase: Phase::ReadingRequest }
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// One non-blocking receive into a fixed `chunk_size`-byte (at least
    /// 4 KiB) scratch region, appended to the inbound buffer. Returns
    /// the byte count: `0` means the peer closed the connection.
    pub fn read_once(&self, chunk_size: usize) -> io::Result<usize> {
        let mut scratch = vec![0u8; chunk_size.max(4096)];
        let n = unsafe { libc::recv(self.fd, scratch.as_mut_ptr() as *mut libc::c_void, scratch.len(), 0) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        let n = n as usize;
        if n > 0 {
            self.inbound.append(&scratch[..n]);
        }
        Ok(n)
    }

    /// Evaluates request framing over the inbound buffer: is there a
    /// complete request sitting in it yet?
    pub fn is_request_ready(&self) -> bool {
        codec::is_request_ready(&self.inbound.snapshot())
    }

    pub fn inbound_snapshot(&self) -> Vec<u8> {
        self.inbound.snapshot()
    }

    /// Serialize `response` into the outbound buffer.
    pub fn prepare_response(&self, response: &Response) {
        self.outbound.clear();
        self.outbound.append(&codec::serialize_response(response));
    }

    /// Attempt to write the entire outbound buffer in one non-blocking
    /// send. On any positive write, the buffer is advanced by the bytes
    /// actually written rather than cleared unconditionally, so a
    /// response larger than the socket's send buffer still arrives
    /// whole across repeated calls.
    pub fn write_once(&self) -> io::Result<WriteOutcome> {
        let snapshot = self.outbound.snapshot();
        if snapshot.is_empty() {
            return Ok(WriteOutcome::Complete);
        }
        let n = unsafe { libc::send(self.fd, snapshot.as_ptr() as *const libc::c_void, snapshot.len(), 0) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                return Ok(WriteOutcome::WouldBlock);
            }
            return Err(err);
        }
        self.outbound.consume(n as usize);
        if self.outbound.is_empty() {
            Ok(WriteOutcome::Complete)
        } else {
            Ok(WriteOutcome::Partial)
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
