//! Blocking client for the ledger-node IPC protocol.
//!
//! A [`Session`] dials a node over TCP (`tcp://host:port`) or a local
//! domain socket (`local:///path`) and runs framed request/response
//! exchanges over it: a 4-byte preamble, a protobuf header frame and a
//! protobuf payload frame each way, every frame prefixed with a big-endian
//! `u32` length. Payload schemas belong to callers, defined as `prost`
//! messages named `ledger.api.req_<operation>`; this crate owns everything
//! beneath them: the control schema, framing, connection lifecycle and the
//! error taxonomy.

pub mod api;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod session;
mod transport;

pub use error::{Category, ProtocolError};
pub use session::Session;
