//! Owns the bound, listening socket and yields accepted client
//! descriptors.
//!
//! Built directly on `socket2` for options `std::net::TcpListener` has
//! no way to set before bind (`SO_REUSEADDR`, non-blocking, the listen
//! backlog).

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::os::fd::{IntoRawFd, RawFd};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::ServeError;

pub struct Listener {
    socket: Socket,
}

impl Listener {
    /// Bind and listen. Host `"0.0.0.0"` or empty means any address;
    /// otherwise the host must be a dotted-quad IPv4 literal (hostname
    /// resolution is out of scope).
    pub fn bind(host: &str, port: u16, backlog: i32) -> Result<Listener, ServeError> {
        let ip = if host.is_empty() || host == "0.0.0.0" {
            Ipv4Addr::UNSPECIFIED
        } else {
            host.parse::<Ipv4Addr>().map_err(|_| ServeError::InvalidHost(host.to_string()))?
        };
        let addr = SocketAddr::new(IpAddr::V4(ip), port);

        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).map_err(ServeError::Socket)?;
        socket.set_reuse_address(true).map_err(ServeError::Socket)?;
        socket.set_nonblocking(true).map_err(ServeError::Socket)?;
        socket.bind(&addr.into()).map_err(|err| ServeError::Bind(addr.to_string(), err))?;
        socket.listen(backlog).map_err(ServeError::Listen)?;

        Ok(Listener { socket })
    }

    /// Non-blocking accept. `Ok(None)` means no pending connection
    /// right now (the accept thread sleeps and retries).
    pub fn accept(&self) -> io::Result<Option<(RawFd, SocketAddr)>> {
        match self.socket.accept() {
            Ok((socket, addr)) => {
                socket.set_nonblocking(true)?;
                let addr = addr.as_socket().unwrap_or_else(|| SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0));
                Ok(Some((socket.into_raw_fd(), addr)))
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket
            .local_addr()?
            .as_socket()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "listening socket has no IPv4/IPv6 address"))
    }

    /// Interrupt a blocked/looping accept thread without physically
    /// closing the descriptor out from under any in-flight `accept()`
    /// call. The real close happens once, in `Drop`, when the last
    /// reference goes away.
    pub fn shutdown(&self) {
        let _ = self.socket.shutdown(std::net::Shutdown::Both);
    }
}

#[cfg(test)]
mod test {
    use super::Listener;

    #[test]
    fn binds_ephemeral_port_on_loopback() {
        let listener = Listener::bind("127.0.0.1", 0, 128).unwrap();
        let addr = listener.local_addr().unwrap();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert!(addr.port() > 0);
    }

    #[test]
    fn rejects_hostname() {
        let err = Listener::bind("localhost", 0, 128).unwrap_err();
        assert!(matches!(err, crate::error::ServeError::InvalidHost(_)));
    }

    #[test]
    fn empty_host_means_any_address() {
        let listener = Listener::bind("", 0, 128).unwrap();
        assert_eq!(listener.local_addr().unwrap().ip().to_string(), "0.0.0.0");
    }

    #[test]
    fn accept_with_no_pending_connection_returns_none() {
        let listener = Listener::bind("127.0.0.1", 0, 128).unwrap();
        assert!(listener.accept().unwrap().is_none());
    }
}
