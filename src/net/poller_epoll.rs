//! Linux backend for the `Poller` abstraction, built directly on
//! `epoll_create1`/`epoll_ctl`/`epoll_wait` via `libc`.

use std::io;
use std::os::fd::RawFd;

use crate::net::poller::{Interest, Poller, Readiness, MAX_EVENTS};

pub struct EpollPoller {
    epfd: RawFd,
}

fn events_for(interest: Interest) -> u32 {
    let mut events = libc::EPOLLERR as u32 | libc::EPOLLHUP as u32;
    if interest.read {
        events |= libc::EPOLLIN as u32;
    }
    if interest.write {
        events |= libc::EPOLLOUT as u32;
    }
    if interest.edge_triggered {
        events |= libc::EPOLLET as u32;
    }
    events
}

impl EpollPoller {
    pub fn new() -> io::Result<EpollPoller> {
        let epfd = unsafe { libc::epoll_create1(0) };
        if epfd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(EpollPoller { epfd })
    }

    fn ctl(&self, op: i32, fd: RawFd, interest: Interest) -> io::Result<()> {
        let mut ev = libc::epoll_event { events: events_for(interest), u64: fd as u64 };
        let rc = unsafe { libc::epoll_ctl(self.epfd, op, fd, &mut ev) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Poller for EpollPoller {
    fn add(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(libc::EPOLL_CTL_ADD, fd, interest)
    }

    fn modify(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(libc::EPOLL_CTL_MOD, fd, interest)
    }

    fn remove(&self, fd: RawFd) -> io::Result<()> {
        let rc = unsafe { libc::epoll_ctl(self.epfd, libc::EPOLL_CTL_DEL, fd, std::ptr::null_mut()) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            // Removing a descriptor someone else already closed must
            // not propagate.
            if err.raw_os_error() == Some(libc::EBADF) || err.raw_os_error() == Some(libc::ENOENT) {
                return Ok(());
            }
            return Err(err);
        }
        Ok(())
    }

    fn poll(&self, timeout_ms: i32) -> io::Result<Vec<Readiness>> {
        let mut raw = [libc::epoll_event { events: 0, u64: 0 }; MAX_EVENTS];
        let n = unsafe { libc::epoll_wait(self.epfd, raw.as_mut_ptr(), MAX_EVENTS as i32, timeout_ms) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(Vec::new());
            }
            return Err(err);
        }
        let mut out = Vec::with_capacity(n as usize);
        for ev in &raw[..n as usize] {
            let flags = ev.events;
            out.push(Readiness {
                fd: ev.u64 as RawFd,
                readable: flags & libc::EPOLLIN as u32 != 0,
                writable: flags & libc::EPOLLOUT as u32 != 0,
                error_or_hangup: flags & (libc::EPOLLERR as u32 | libc::EPOLLHUP as u32) != 0,
            });
        }
        Ok(out)
    }
}

impl Drop for EpollPoller {
    fn drop(&mut self) {
        unsafe { libc::close(self.epfd) };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::TcpListener;
    use std::os::fd::AsRawFd;

    #[test]
    fn add_poll_remove_round_trip() {
        let poller = EpollPoller::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let fd = listener.as_raw_fd();
        poller.add(fd, Interest::read_edge_triggered()).unwrap();
        // Nothing connected yet: a short poll should time out with no events.
        let events = poller.poll(10).unwrap();
        assert!(events.is_empty());
        poller.remove(fd).unwrap();
        // Removing again must not be an error even though it's already gone.
        assert!(poller.remove(fd).is_ok());
    }
}
