//! Control schema for the ledger-node exchange.
//!
//! The node frames every exchange with a small protobuf envelope: a request
//! header naming the operation, and a response header carrying node-side
//! error fields. These messages and the operation registry are owned by this
//! crate; payload schemas are owned by callers. There is little enough here
//! that the types are written out by hand instead of generated from `.proto`
//! sources at build time.

use prost::Message;

/// Fully-qualified name prefix shared by every request payload message.
///
/// Request payloads are named `ledger.api.req_<operation>`; the operation
/// part, uppercased, is the wire identifier of a [`RequestType`].
pub const REQUEST_NAME_PREFIX: &str = "ledger.api.req_";

/// Operation registry understood by the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum RequestType {
    /// Sentinel for an unresolvable operation; never sent on the wire.
    Invalid = 0,
    /// Liveness probe.
    Ping = 1,
    /// Pending (unreceived) amounts for a set of accounts.
    AccountPending = 2,
    /// Confirmed balance of an account.
    AccountBalance = 3,
    /// Block totals known to the node.
    BlockCount = 4,
    /// Contents of a single block.
    BlockInfo = 5,
}

impl RequestType {
    /// Wire identifier for this operation.
    #[must_use]
    pub const fn as_wire_name(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Ping => "PING",
            Self::AccountPending => "ACCOUNT_PENDING",
            Self::AccountBalance => "ACCOUNT_BALANCE",
            Self::BlockCount => "BLOCK_COUNT",
            Self::BlockInfo => "BLOCK_INFO",
        }
    }

    /// Parse a wire identifier back into an operation.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "INVALID" => Some(Self::Invalid),
            "PING" => Some(Self::Ping),
            "ACCOUNT_PENDING" => Some(Self::AccountPending),
            "ACCOUNT_BALANCE" => Some(Self::AccountBalance),
            "BLOCK_COUNT" => Some(Self::BlockCount),
            "BLOCK_INFO" => Some(Self::BlockInfo),
            _ => None,
        }
    }
}

/// Envelope sent ahead of every request payload.
#[derive(Clone, PartialEq, Message)]
pub struct RequestHeader {
    /// Operation the payload frame carries, as a [`RequestType`] value.
    #[prost(enumeration = "RequestType", tag = "1")]
    pub request_type: i32,
}

/// Envelope received ahead of every response payload.
///
/// The node reports request-level failures in these fields. The client
/// decodes the header to prove the frame is well formed and then discards
/// it; callers only ever see payload data.
#[derive(Clone, PartialEq, Message)]
pub struct ResponseHeader {
    /// Node-side error code; 0 means the request succeeded.
    #[prost(uint32, tag = "1")]
    pub error_code: u32,
    /// Node-side error description.
    #[prost(string, tag = "2")]
    pub error_message: String,
    /// Node-side error category.
    #[prost(string, tag = "3")]
    pub error_category: String,
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
