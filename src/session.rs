//! Client session against a ledger node.
//!
//! ARCHITECTURE
//! ============
//! A session owns at most one blocking connection and drives the framed
//! request/response exchange over it: 4-byte preamble, length-prefixed
//! header frame, length-prefixed payload frame, then the same three
//! sections mirrored back by the node. One mutex serializes `connect`,
//! `close` and the whole of `request`, so concurrent callers share a
//! session without interleaving wire traffic.
//!
//! TRADE-OFFS
//! ==========
//! Deadlines are refreshed before every individual socket operation rather
//! than computed once per exchange. A slow node therefore cannot fail an
//! exchange that keeps making progress, at the cost of no overall time
//! bound. Failed exchanges leave the connection in an unknown protocol
//! state on purpose: recovery policy (close, reconnect, give up) belongs to
//! the caller, and this crate never retries on its own.

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use prost::{Message, Name};

use crate::api::{RequestHeader, ResponseHeader};
use crate::codec;
use crate::error::ProtocolError;
use crate::protocol::{self, Preamble};
use crate::transport::{self, Conn};

/// Timeout applied to each socket read and write when unset.
const DEFAULT_READ_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to dialing when unset.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

struct Inner {
    conn: Option<Box<dyn Conn>>,
    read_write_timeout: Duration,
    connect_timeout: Duration,
}

/// Client session for request/response exchanges with a ledger node.
///
/// Starts disconnected; [`connect`](Self::connect) establishes the
/// transport and [`request`](Self::request) runs exchanges over it. A
/// closed session may be reused by connecting again.
pub struct Session {
    inner: Mutex<Inner>,
}

impl Session {
    /// Disconnected session with default timeouts (30 s per socket
    /// operation, 10 s to connect).
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                conn: None,
                read_write_timeout: DEFAULT_READ_WRITE_TIMEOUT,
                connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            }),
        }
    }

    /// Set the per-operation read/write timeout. Zero disables deadlines.
    pub fn set_read_write_timeout(&self, timeout: Duration) {
        self.lock_inner().read_write_timeout = timeout;
    }

    /// Set the dial timeout used by [`connect`](Self::connect). Zero means
    /// an unbounded dial.
    pub fn set_connect_timeout(&self, timeout: Duration) {
        self.lock_inner().connect_timeout = timeout;
    }

    /// Whether the session currently holds a connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock_inner().conn.is_some()
    }

    /// Connect to the node at `connection_string` (`tcp://host:port` or
    /// `local:///path/to/socket`).
    ///
    /// Success replaces any previous connection (the old handle is dropped,
    /// which closes it). Failure leaves the session disconnected.
    ///
    /// # Errors
    ///
    /// Connection-category failures for unparseable strings, unsupported
    /// schemes and unreachable endpoints.
    pub fn connect(&self, connection_string: &str) -> Result<(), ProtocolError> {
        let mut inner = self.lock_inner();
        match transport::dial(connection_string, inner.connect_timeout) {
            Ok(conn) => {
                inner.conn = Some(conn);
                Ok(())
            }
            Err(e) => {
                inner.conn = None;
                Err(e)
            }
        }
    }

    /// Shut down and drop the connection, if any. Closing a disconnected
    /// session succeeds, so `close` is always idempotent.
    ///
    /// # Errors
    ///
    /// Connection-category failure when the socket shutdown itself fails;
    /// the handle is dropped either way.
    pub fn close(&self) -> Result<(), ProtocolError> {
        let mut inner = self.lock_inner();
        match inner.conn.take() {
            Some(mut conn) => conn
                .shutdown()
                .map_err(|e| ProtocolError::connection(e.to_string())),
            None => Ok(()),
        }
    }

    /// Run one request/response exchange: send `request`, decode the node's
    /// reply into `response`.
    ///
    /// The exchange holds the session lock end to end. Any failing step
    /// aborts the exchange immediately; the connection is then in an
    /// unknown protocol state and it is the caller's choice to `close`,
    /// reconnect or drop the session. Nothing is ever retried.
    ///
    /// # Errors
    ///
    /// Network-category failures for socket traffic (including
    /// `"Not connected"` when no connection is held and `"Invalid
    /// preamble"` for a malformed reply), Marshalling for protobuf decode
    /// failures, API when the node speaks a newer major protocol version.
    ///
    /// # Panics
    ///
    /// Panics when `Req`'s protobuf name does not resolve to a known
    /// operation; see [`codec::request_type`].
    pub fn request<Req, Res>(&self, request: &Req, response: &mut Res) -> Result<(), ProtocolError>
    where
        Req: Name,
        Res: Message + Default,
    {
        let mut inner = self.lock_inner();
        let timeout = inner.read_write_timeout;
        let Some(conn) = inner.conn.as_deref_mut() else {
            return Err(ProtocolError::network("Not connected"));
        };

        // Request preamble.
        conn.refresh_write_deadline(timeout).map_err(sock_err)?;
        conn.write_all(&Preamble::current().to_bytes())
            .map_err(sock_err)?;

        // Resolve the operation; aborts on a schema mismatch.
        let request_type = codec::request_type::<Req>();
        let code = request_type as i32;
        tracing::debug!(request_type = request_type.as_wire_name(), code, "sending request");

        // Header frame, then payload frame.
        let header = RequestHeader { request_type: code };
        send_frame(conn, timeout, &codec::serialize(&header))?;
        send_frame(conn, timeout, &codec::serialize(request))?;

        // Response preamble.
        let mut preamble_bytes = [0u8; protocol::PREAMBLE_LEN];
        recv_exact(conn, timeout, &mut preamble_bytes)?;
        Preamble::parse(preamble_bytes)?;

        // Response header: decoded to prove the frame is well formed, then
        // discarded.
        let header_frame = recv_frame(conn, timeout)?;
        codec::deserialize(&mut ResponseHeader::default(), &header_frame)?;

        // Response payload.
        let payload_frame = recv_frame(conn, timeout)?;
        codec::deserialize(response, &payload_frame)?;

        Ok(())
    }

    /// Internal: attach an established connection directly (for testing).
    #[cfg(test)]
    fn attach_conn(&self, conn: Box<dyn Conn>) {
        self.lock_inner().conn = Some(conn);
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        // A panic from request-type resolution can poison the lock; the
        // state itself stays coherent, so recover it instead of wedging
        // every later caller.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one length-prefixed frame.
fn send_frame(conn: &mut dyn Conn, timeout: Duration, bytes: &[u8]) -> Result<(), ProtocolError> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| ProtocolError::marshalling("frame length exceeds u32 range"))?;

    conn.refresh_write_deadline(timeout).map_err(sock_err)?;
    conn.write_all(&len.to_be_bytes()).map_err(sock_err)?;
    conn.refresh_write_deadline(timeout).map_err(sock_err)?;
    conn.write_all(bytes).map_err(sock_err)?;
    Ok(())
}

/// Read one length-prefixed frame. Short reads and oversize length words
/// fail the exchange before any decode is attempted.
fn recv_frame(conn: &mut dyn Conn, timeout: Duration) -> Result<Vec<u8>, ProtocolError> {
    let mut len_bytes = [0u8; protocol::FRAME_LEN_BYTES];
    recv_exact(conn, timeout, &mut len_bytes)?;

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > protocol::MAX_FRAME_LEN {
        return Err(ProtocolError::network(format!(
            "frame length {len} exceeds maximum {}",
            protocol::MAX_FRAME_LEN
        )));
    }

    let mut frame = vec![0u8; len];
    recv_exact(conn, timeout, &mut frame)?;
    Ok(frame)
}

fn recv_exact(conn: &mut dyn Conn, timeout: Duration, buf: &mut [u8]) -> Result<(), ProtocolError> {
    conn.refresh_read_deadline(timeout).map_err(sock_err)?;
    conn.read_exact(buf).map_err(sock_err)
}

fn sock_err(err: io::Error) -> ProtocolError {
    ProtocolError::network(err.to_string())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
