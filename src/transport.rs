//! Blocking socket transport behind the session.
//!
//! ARCHITECTURE
//! ============
//! The session drives a boxed [`Conn`]: plain blocking `Read`/`Write` plus
//! per-call deadline refresh and shutdown. `TcpStream` and `UnixStream`
//! implement it directly through their `set_read_timeout`/`set_write_timeout`
//! knobs; tests substitute a scripted in-memory connection.
//!
//! TRADE-OFFS
//! ==========
//! Dialing goes through `socket2` rather than the std constructors because
//! the protocol wants a connect timeout on both address families and a
//! keep-alive probe interval on TCP, neither of which std exposes. The
//! sockets it hands back are ordinary blocking std streams.

use std::ffi::OsStr;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::UnixStream;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use socket2::{Domain, Protocol, SockAddr, Socket, TcpKeepalive, Type};
use url::{Host, Url};

use crate::error::ProtocolError;

/// Keep-alive probe interval set on TCP connections.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Blocking connection the session drives.
///
/// Deadlines are refreshed before every individual read or write, never set
/// once for a whole exchange. A zero timeout disables the deadline.
pub(crate) trait Conn: fmt::Debug + Read + Write + Send {
    /// Bound reads issued after this call to `timeout` from now.
    fn refresh_read_deadline(&mut self, timeout: Duration) -> io::Result<()>;

    /// Bound writes issued after this call to `timeout` from now.
    fn refresh_write_deadline(&mut self, timeout: Duration) -> io::Result<()>;

    /// Shut the connection down in both directions. An already-gone peer is
    /// not an error.
    fn shutdown(&mut self) -> io::Result<()>;
}

fn timeout_opt(timeout: Duration) -> Option<Duration> {
    if timeout.is_zero() { None } else { Some(timeout) }
}

fn ignore_not_connected(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}

impl Conn for TcpStream {
    fn refresh_read_deadline(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_read_timeout(timeout_opt(timeout))
    }

    fn refresh_write_deadline(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_write_timeout(timeout_opt(timeout))
    }

    fn shutdown(&mut self) -> io::Result<()> {
        ignore_not_connected(TcpStream::shutdown(self, Shutdown::Both))
    }
}

impl Conn for UnixStream {
    fn refresh_read_deadline(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_read_timeout(timeout_opt(timeout))
    }

    fn refresh_write_deadline(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_write_timeout(timeout_opt(timeout))
    }

    fn shutdown(&mut self) -> io::Result<()> {
        ignore_not_connected(UnixStream::shutdown(self, Shutdown::Both))
    }
}

/// Open a blocking connection to `connection_string`.
///
/// Accepts `tcp://host:port` and `local:///path/to/socket`; anything else is
/// a Connection-category failure.
pub(crate) fn dial(
    connection_string: &str,
    connect_timeout: Duration,
) -> Result<Box<dyn Conn>, ProtocolError> {
    let url = Url::parse(connection_string)
        .map_err(|e| ProtocolError::connection(format!("Invalid connection string: {e}")))?;

    match url.scheme() {
        "tcp" => dial_tcp(&url, connect_timeout),
        "local" => dial_local(&url, connect_timeout),
        _ => Err(ProtocolError::connection("Invalid schema: Use tcp or local.")),
    }
}

fn dial_tcp(url: &Url, connect_timeout: Duration) -> Result<Box<dyn Conn>, ProtocolError> {
    let host = url
        .host()
        .ok_or_else(|| ProtocolError::connection("Invalid connection string: missing host"))?;
    let port = url
        .port()
        .ok_or_else(|| ProtocolError::connection("Invalid connection string: missing port"))?;

    // Literal addresses (including bracketed IPv6) connect directly; only
    // domain names go through the resolver.
    let addrs: Vec<SocketAddr> = match host {
        Host::Ipv4(ip) => vec![SocketAddr::new(IpAddr::V4(ip), port)],
        Host::Ipv6(ip) => vec![SocketAddr::new(IpAddr::V6(ip), port)],
        Host::Domain(name) => (name, port)
            .to_socket_addrs()
            .map_err(|e| ProtocolError::connection(e.to_string()))?
            .collect(),
    };

    let mut last_err: Option<io::Error> = None;
    for addr in addrs {
        match connect_tcp_addr(addr, connect_timeout) {
            Ok(stream) => {
                tracing::debug!(%addr, "connected to node");
                return Ok(Box::new(stream));
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(ProtocolError::connection(last_err.map_or_else(
        || format!("no addresses resolved for {host}:{port}"),
        |e| e.to_string(),
    )))
}

fn connect_tcp_addr(addr: SocketAddr, connect_timeout: Duration) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_INTERVAL)
        .with_interval(KEEPALIVE_INTERVAL);
    socket.set_tcp_keepalive(&keepalive)?;
    socket.set_nodelay(true)?;

    connect_with_timeout(&socket, &SockAddr::from(addr), connect_timeout)?;
    Ok(socket.into())
}

fn dial_local(url: &Url, connect_timeout: Duration) -> Result<Box<dyn Conn>, ProtocolError> {
    // The socket path is the URI's path component; a host part, if present,
    // carries no meaning for local sockets.
    let path = url.path();
    if path.is_empty() {
        return Err(ProtocolError::connection(
            "Invalid connection string: missing socket path",
        ));
    }

    // URI paths arrive percent-encoded; the filesystem wants the raw bytes.
    let decoded: Vec<u8> = percent_decode_str(path).collect();
    let stream = connect_local_path(OsStr::from_bytes(&decoded), connect_timeout)
        .map_err(|e| ProtocolError::connection(e.to_string()))?;
    tracing::debug!(%path, "connected to node");
    Ok(Box::new(stream))
}

fn connect_local_path(path: &OsStr, connect_timeout: Duration) -> io::Result<UnixStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let addr = SockAddr::unix(path)?;
    connect_with_timeout(&socket, &addr, connect_timeout)?;
    Ok(socket.into())
}

fn connect_with_timeout(socket: &Socket, addr: &SockAddr, timeout: Duration) -> io::Result<()> {
    if timeout.is_zero() {
        socket.connect(addr)
    } else {
        socket.connect_timeout(addr, timeout)
    }
}


#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
