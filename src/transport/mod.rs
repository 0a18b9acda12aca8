//! Listening socket and accepted connections.
//!
//! Everything platform specific stays behind `std::net`; the rest of the crate only
//! sees [`Listener`], [`Connection`] and the [`Stream`] trait.

use std::{
    fmt,
    io::{self, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
};

use tracing::{debug, info};

use crate::error::HttpError;

/// A bidirectional byte stream a connection can be served over.
pub trait Stream: Read + Write + Send {}

impl<T: Read + Write + Send> Stream for T {}

/// A bound, listening TCP socket.
///
/// The socket is closed when the listener is dropped.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Binds a listener on every local interface at `port`.
    ///
    /// # Errors
    ///
    /// See [`Listener::bind`].
    pub fn listen(port: u16) -> Result<Self, HttpError> {
        Self::bind(("0.0.0.0", port))
    }

    /// Resolves `addr` and binds the first address that accepts the bind.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::AddressResolution` if `addr` cannot be resolved and
    /// `HttpError::NoAvailableAddress` if no resolved address could be bound.
    pub fn bind<A: ToSocketAddrs + fmt::Debug>(addr: A) -> Result<Self, HttpError> {
        let candidates = addr
            .to_socket_addrs()
            .map_err(|e| HttpError::AddressResolution(format!("{addr:?}: {e}")))?;

        for candidate in candidates {
            match TcpListener::bind(candidate) {
                Ok(inner) => {
                    info!(address = %candidate, "listening");
                    return Ok(Self { inner });
                }
                Err(e) => debug!(address = %candidate, cause = %e, "bind failed, trying next address"),
            }
        }

        Err(HttpError::NoAvailableAddress)
    }

    /// Blocks until a client connects.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Accept` if the accept call fails.
    pub fn accept(&self) -> Result<Connection, HttpError> {
        let (stream, peer) = self.inner.accept().map_err(HttpError::Accept)?;
        Ok(Connection { stream, peer })
    }

    /// The address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Io` if the socket cannot report its address.
    pub fn local_addr(&self) -> Result<SocketAddr, HttpError> {
        Ok(self.inner.local_addr()?)
    }
}

/// An accepted client connection. The socket is closed when this value is dropped.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Address of the connected client.
    #[must_use]
    pub const fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}
