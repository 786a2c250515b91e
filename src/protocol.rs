//! Byte-level constants and the exchange preamble.
//!
//! Every request and every response opens with a fixed 4-byte preamble
//! `[lead, encoding, version_major, version_minor]`, followed by two
//! length-prefixed frames (header, then payload). This module owns those
//! byte values and the preamble validation rules; the session drives the
//! actual I/O.

use crate::error::ProtocolError;

/// First preamble byte, identifying ledger-node protocol traffic.
pub const PREAMBLE_LEAD: u8 = b'N';

/// Payload encoding identifier. 0 is protobuf, the only defined encoding.
pub const WIRE_ENCODING: u8 = 0;

/// Protocol major version this client speaks.
pub const VERSION_MAJOR: u8 = 1;

/// Protocol minor version this client speaks.
pub const VERSION_MINOR: u8 = 0;

/// Size of the preamble on the wire.
pub const PREAMBLE_LEN: usize = 4;

/// Size of the big-endian length word prefixing each frame.
pub const FRAME_LEN_BYTES: usize = 4;

/// Upper bound accepted for a declared frame length. Keeps a corrupt length
/// word from driving a giant allocation.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Protocol version pair exchanged in the preamble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preamble {
    /// Major version; mismatches here are not compatible.
    pub version_major: u8,
    /// Minor version; informational, never rejected.
    pub version_minor: u8,
}

impl Preamble {
    /// Preamble advertising the version this client speaks.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
        }
    }

    /// Wire form of the preamble.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; PREAMBLE_LEN] {
        [
            PREAMBLE_LEAD,
            WIRE_ENCODING,
            self.version_major,
            self.version_minor,
        ]
    }

    /// Validate a received preamble.
    ///
    /// # Errors
    ///
    /// Network `"Invalid preamble"` for a wrong lead or encoding byte; API
    /// `"Unsupported API version"` when the peer's major version is newer
    /// than [`VERSION_MAJOR`]. Older majors and any minor are accepted.
    pub fn parse(bytes: [u8; PREAMBLE_LEN]) -> Result<Self, ProtocolError> {
        if bytes[0] != PREAMBLE_LEAD || bytes[1] != WIRE_ENCODING {
            return Err(ProtocolError::network("Invalid preamble"));
        }
        if bytes[2] > VERSION_MAJOR {
            return Err(ProtocolError::api("Unsupported API version"));
        }

        Ok(Self {
            version_major: bytes[2],
            version_minor: bytes[3],
        })
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
