//! BSD/macOS backend for the `Poller` abstraction, built directly on
//! `kqueue`/`kevent` via `libc`.

use std::io;
use std::os::fd::RawFd;
use std::ptr;

use crate::net::poller::{Interest, Poller, Readiness, MAX_EVENTS};

pub struct KqueuePoller {
    kq: RawFd,
}

impl KqueuePoller {
    pub fn new() -> io::Result<KqueuePoller> {
        let kq = unsafe { libc::kqueue() };
        if kq < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(KqueuePoller { kq })
    }

    fn change(&self, fd: RawFd, filter: i16, flags: u16) -> io::Result<()> {
        let mut kev = libc::kevent {
            ident: fd as usize,
            filter,
            flags,
            fflags: 0,
            data: 0,
            udata: ptr::null_mut(),
        };
        let rc = unsafe { libc::kevent(self.kq, &mut kev, 1, ptr::null_mut(), 0, ptr::null()) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Poller for KqueuePoller {
    fn add(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.modify(fd, interest)
    }

    fn modify(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        let edge = if interest.edge_triggered { libc::EV_CLEAR } else { 0 };
        // kqueue has no combined "modify" for which filters are active;
        // always (re)register READ and toggle WRITE explicitly, which
        // mirrors the ADD/DELETE semantics `modify` needs to expose.
        self.change(fd, libc::EVFILT_READ, libc::EV_ADD | edge)?;
        if interest.write {
            self.change(fd, libc::EVFILT_WRITE, libc::EV_ADD | edge)?;
        } else {
            // Deleting a filter that was never added is harmless on kqueue.
            let _ = self.change(fd, libc::EVFILT_WRITE, libc::EV_DELETE);
        }
        Ok(())
    }

    fn remove(&self, fd: RawFd) -> io::Result<()> {
        let read_err = self.change(fd, libc::EVFILT_READ, libc::EV_DELETE);
        let write_err = self.change(fd, libc::EVFILT_WRITE, libc::EV_DELETE);
        for result in [read_err, write_err] {
            if let Err(err) = result {
                // ENOENT/EBADF: already gone, not an error.
                if err.raw_os_error() != Some(libc::ENOENT) && err.raw_os_error() != Some(libc::EBADF) {
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn poll(&self, timeout_ms: i32) -> io::Result<Vec<Readiness>> {
        let mut raw: [libc::kevent; MAX_EVENTS] = unsafe { std::mem::zeroed() };
        let timeout = if timeout_ms < 0 {
            None
        } else {
            Some(libc::timespec {
                tv_sec: (timeout_ms / 1000) as libc::time_t,
                tv_nsec: ((timeout_ms % 1000) * 1_000_000) as libc::c_long,
            })
        };
        let timeout_ptr = timeout.as_ref().map_or(ptr::null(), |t| t as *const _);
        let n = unsafe {
            libc::kevent(self.kq, ptr::null(), 0, raw.as_mut_ptr(), MAX_EVENTS as i32, timeout_ptr)
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(Vec::new());
            }
            return Err(err);
        }

        // Multiple kevent entries (READ + WRITE) may report for the same
        // fd in one batch; merge them into one Readiness per descriptor.
        let mut out: Vec<Readiness> = Vec::new();
        for ev in &raw[..n as usize] {
            let fd = ev.ident as RawFd;
            let error_or_hangup = ev.flags & libc::EV_EOF != 0 || ev.flags & libc::EV_ERROR != 0;
            if let Some(existing) = out.iter_mut().find(|r| r.fd == fd) {
                existing.readable |= ev.filter == libc::EVFILT_READ;
                existing.writable |= ev.filter == libc::EVFILT_WRITE;
                existing.error_or_hangup |= error_or_hangup;
            } else {
                out.push(Readiness {
                    fd,
                    readable: ev.filter == libc::EVFILT_READ,
                    writable: ev.filter == libc::EVFILT_WRITE,
                    error_or_hangup,
                });
            }
        }
        Ok(out)
    }
}

impl Drop for KqueuePoller {
    fn drop(&mut self) {
        unsafe { libc::close(self.kq) };
    }
}
