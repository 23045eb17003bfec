//! Lazily-connecting blocking stream transport.
//!
//! [`StreamTransport`] wraps one outbound byte connection. Construction
//! validates the scheme but performs no I/O; the connection is established
//! on first use and reused afterwards. Writes are atomic: a short write is
//! surfaced as a total failure, because the wire protocol has no way to
//! resume a truncated frame. Retry, backoff, and reconnect policy belong to
//! the caller.

use native_tls::{TlsConnector, TlsStream};
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Bound on connection establishment.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while constructing or using a stream transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The scheme is not among the stream transports this runtime supports.
    #[error("unsupported stream transport: {0}")]
    UnsupportedTransport(String),

    /// Connection establishment was refused, failed, or timed out.
    #[error("failed to connect to {target}")]
    ConnectionFailure {
        /// The `scheme://host:port` descriptor of the connection target.
        target: String,
        /// The underlying connect error.
        #[source]
        source: io::Error,
    },

    /// A write succeeded partially or not at all.
    #[error("failed to write to {target}")]
    WriteFailure {
        /// The `scheme://host:port` descriptor of the connection target.
        target: String,
        /// The underlying write error; short writes carry a
        /// [`std::io::ErrorKind::WriteZero`] error with the byte counts.
        #[source]
        source: io::Error,
    },
}

/// Transport scheme of an outbound byte-stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain TCP stream.
    Tcp,
    /// Connectionless UDP datagrams.
    Udp,
    /// TLS-wrapped TCP stream.
    Tls,
}

impl Scheme {
    /// Returns the lowercase scheme identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Tls => "tls",
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = TransportError;

    /// Parses a scheme identifier, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "tls" => Ok(Self::Tls),
            _ => Err(TransportError::UnsupportedTransport(s.to_string())),
        }
    }
}

/// An established outbound byte connection.
///
/// Obtained from [`StreamTransport::connection`]; usable directly as a
/// [`std::io::Write`] when callers need raw access to the stream.
#[derive(Debug)]
pub struct Connection(Inner);

#[derive(Debug)]
enum Inner {
    Tcp(TcpStream),
    Udp(UdpSocket),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.0 {
            Inner::Tcp(stream) => stream.write(buf),
            Inner::Udp(socket) => socket.send(buf),
            Inner::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.0 {
            Inner::Tcp(stream) => stream.flush(),
            // datagrams are handed to the kernel whole
            Inner::Udp(_) => Ok(()),
            Inner::Tls(stream) => stream.flush(),
        }
    }
}

/// A lazily-connecting wrapper around one outbound byte-stream connection.
///
/// Construction stores the target and validates the scheme without opening
/// anything. The connection is established at most once, on the first
/// [`write`](Self::write) or [`connection`](Self::connection) call, and is
/// reused by every subsequent call. If establishment fails nothing is
/// cached and the next call attempts it again. Dropping the transport
/// closes the connection.
///
/// The transport is synchronous and is not internally synchronized:
/// concurrent writers must be serialized externally, since interleaved
/// partial writes on one stream would corrupt framing.
///
/// # Example
///
/// ```no_run
/// use gelf_client::transport::StreamTransport;
///
/// let mut transport = StreamTransport::new("udp", "127.0.0.1", 12201)?;
/// let written = transport.write(b"hello")?;
/// assert_eq!(written, 5);
/// # Ok::<(), gelf_client::transport::TransportError>(())
/// ```
#[derive(Debug)]
pub struct StreamTransport {
    scheme: Scheme,
    host: String,
    port: u16,
    options: Map<String, Value>,
    connection: Option<Connection>,
}

impl StreamTransport {
    /// Creates a transport for `scheme://host:port` without connecting.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::UnsupportedTransport`] when `scheme` is
    /// not one of `tcp`, `udp`, or `tls`. No I/O is attempted.
    pub fn new(scheme: &str, host: impl Into<String>, port: u16) -> Result<Self, TransportError> {
        Ok(Self {
            scheme: scheme.parse()?,
            host: host.into(),
            port,
            options: Map::new(),
            connection: None,
        })
    }

    /// Attaches transport-specific context options.
    ///
    /// The keys are opaque to the transport core; the TLS path reads
    /// `verify_peer` (bool, default `true`) and `allow_self_signed` (bool,
    /// default `false`).
    #[must_use]
    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = options;
        self
    }

    /// Returns the transport scheme.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns the target host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the target port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns true when a connection is currently established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns the established connection, connecting first if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionFailure`] when establishment
    /// does not succeed within [`CONNECT_TIMEOUT`] or is rejected. The
    /// transport remains usable; the next call attempts establishment
    /// again.
    pub fn connection(&mut self) -> Result<&mut Connection, TransportError> {
        let descriptor = self.descriptor();
        match &mut self.connection {
            Some(connection) => Ok(connection),
            connection @ None => {
                let established =
                    establish(self.scheme, &self.host, self.port, &self.options, &descriptor)?;
                debug!(peer = %descriptor, "established connection");
                Ok(connection.insert(established))
            }
        }
    }

    /// Writes the full buffer and returns the number of bytes written,
    /// which always equals `buffer.len()` on success.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionFailure`] when the lazy
    /// connection cannot be established, and
    /// [`TransportError::WriteFailure`] when the write errors or transmits
    /// fewer bytes than the buffer holds. A short write is a total
    /// failure; no partial byte count is ever reported as success.
    pub fn write(&mut self, buffer: &[u8]) -> Result<usize, TransportError> {
        let descriptor = self.descriptor();
        let connection = self.connection()?;

        let write_failure = |source: io::Error| TransportError::WriteFailure {
            target: descriptor.clone(),
            source,
        };

        let written = connection.write(buffer).map_err(write_failure)?;
        if written != buffer.len() {
            return Err(TransportError::WriteFailure {
                target: descriptor,
                source: io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("wrote {written} of {} bytes", buffer.len()),
                ),
            });
        }
        connection.flush().map_err(|source| TransportError::WriteFailure {
            target: descriptor.clone(),
            source,
        })?;

        trace!(peer = %descriptor, bytes = written, "wrote buffer");
        Ok(written)
    }

    /// Closes the connection if one was established.
    ///
    /// Idempotent and safe to call when the transport never connected.
    /// The next call to [`connection`](Self::connection) or
    /// [`write`](Self::write) establishes a fresh connection.
    pub fn close(&mut self) {
        if self.connection.take().is_some() {
            debug!(peer = %self.descriptor(), "closed connection");
        }
    }

    /// Returns the `scheme://host:port` descriptor of the target.
    #[must_use]
    pub fn descriptor(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Opens a connection to `host:port` over the given scheme.
fn establish(
    scheme: Scheme,
    host: &str,
    port: u16,
    options: &Map<String, Value>,
    descriptor: &str,
) -> Result<Connection, TransportError> {
    let fail = |source: io::Error| TransportError::ConnectionFailure {
        target: descriptor.to_string(),
        source,
    };

    let addr = resolve(host, port).map_err(&fail)?;
    let inner = match scheme {
        Scheme::Tcp => {
            let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(&fail)?;
            Inner::Tcp(stream)
        }
        Scheme::Udp => {
            let local: SocketAddr = match addr {
                SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
                SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
            };
            let socket = UdpSocket::bind(local).map_err(&fail)?;
            socket.connect(addr).map_err(&fail)?;
            Inner::Udp(socket)
        }
        Scheme::Tls => {
            let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(&fail)?;
            let connector = tls_connector(options).map_err(&fail)?;
            let tls = connector
                .connect(host, stream)
                .map_err(|err| fail(io::Error::other(err.to_string())))?;
            Inner::Tls(Box::new(tls))
        }
    };

    Ok(Connection(inner))
}

/// Resolves `host:port` to the first usable socket address.
fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "hostname resolved to no addresses",
        )
    })
}

/// Builds a TLS connector from the context options.
fn tls_connector(options: &Map<String, Value>) -> io::Result<TlsConnector> {
    let verify_peer = options
        .get("verify_peer")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    let allow_self_signed = options
        .get("allow_self_signed")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut builder = TlsConnector::builder();
    if !verify_peer {
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    }
    if allow_self_signed {
        builder.danger_accept_invalid_certs(true);
    }
    builder.build().map_err(io::Error::other)
}
