//! Wire codec: pure message/byte conversions and request-type resolution.
//!
//! No I/O happens here. The session feeds these functions the byte buffers
//! it moves over the socket, and callers' own protobuf types flow through
//! the generic bounds.

use prost::{Message, Name};

use crate::api::{self, RequestType};
use crate::error::ProtocolError;

/// Encode a message into protobuf bytes.
#[must_use]
pub fn serialize<M: Message>(message: &M) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.encoded_len());
    // Encoding into a growable Vec cannot fail; the only error prost can
    // return here is `BufferTooSmall`, which a Vec never produces.
    message.encode(&mut out).unwrap_or_default();
    out
}

/// Decode `bytes` into `target`, replacing its previous contents entirely.
///
/// Decoding into a fresh value first keeps merge semantics out of the
/// picture: no field of the previous contents survives, repeated fields
/// included.
///
/// # Errors
///
/// Marshalling-category failure when the bytes are not a valid encoding of
/// the message type.
pub fn deserialize<M: Message + Default>(target: &mut M, bytes: &[u8]) -> Result<(), ProtocolError> {
    *target = M::decode(bytes).map_err(|e| ProtocolError::marshalling(e.to_string()))?;
    Ok(())
}

/// Wire identifier derived from a request message's protobuf name.
///
/// `ledger.api.req_ping` becomes `PING`. A name without the request prefix
/// passes through unchanged before uppercasing, and will not resolve.
#[must_use]
pub fn wire_name<M: Name>() -> String {
    let full = M::full_name();
    full.strip_prefix(api::REQUEST_NAME_PREFIX)
        .unwrap_or(&full)
        .to_uppercase()
}

/// Resolve the operation a request message maps to.
///
/// # Panics
///
/// Panics when the message name does not map to a known operation. That is a
/// schema mismatch between this binary and its protocol definition, a
/// programmer error no caller can meaningfully handle at runtime.
#[must_use]
pub fn request_type<M: Name>() -> RequestType {
    let name = wire_name::<M>();
    match RequestType::from_wire_name(&name) {
        Some(ty) if ty != RequestType::Invalid => ty,
        _ => panic!("invalid request type: {name}"),
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod tests;
