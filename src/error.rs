//! Error values shared across the protocol client.
//!
//! Every fallible operation in this crate fails with a [`ProtocolError`]: a
//! small value type carrying the numeric code, optional category and message
//! that the ledger-node protocol attaches to failures. The Display form is
//! part of the protocol contract; the category section is elided when no
//! category is set.

/// Error code carried by every failure this crate constructs. Code 0 means
/// "no error" on the wire and is never built here.
const FAILURE_CODE: u32 = 1;

/// Coarse failure class attached to a [`ProtocolError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Connection-string parsing, dialing and teardown failures.
    Connection,
    /// Socket traffic failures and framing violations.
    Network,
    /// Protobuf encode/decode failures.
    Marshalling,
    /// Peer speaks a protocol version this client does not support.
    Api,
}

impl Category {
    /// Wire spelling of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "Connection",
            Self::Network => "Network",
            Self::Marshalling => "Marshalling",
            Self::Api => "API",
        }
    }
}

/// Failure reported by a session or codec operation.
///
/// Renders as `"<code>:<category>:<message>"`, or `"<code>:<message>"` when
/// no category is set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.wire_format())]
pub struct ProtocolError {
    /// Numeric error code.
    pub code: u32,
    /// Failure class, when one applies.
    pub category: Option<Category>,
    /// Human-readable description.
    pub message: String,
}

impl ProtocolError {
    /// Build an error from its raw parts.
    #[must_use]
    pub fn new(code: u32, category: Option<Category>, message: impl Into<String>) -> Self {
        Self {
            code,
            category,
            message: message.into(),
        }
    }

    /// Connection-category failure with the standard code.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(FAILURE_CODE, Some(Category::Connection), message)
    }

    /// Network-category failure with the standard code.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FAILURE_CODE, Some(Category::Network), message)
    }

    /// Marshalling-category failure with the standard code.
    #[must_use]
    pub fn marshalling(message: impl Into<String>) -> Self {
        Self::new(FAILURE_CODE, Some(Category::Marshalling), message)
    }

    /// API-category failure with the standard code.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(FAILURE_CODE, Some(Category::Api), message)
    }

    /// Wire rendering behind the Display impl.
    fn wire_format(&self) -> String {
        match self.category {
            Some(category) => format!("{}:{}:{}", self.code, category.as_str(), self.message),
            None => format!("{}:{}", self.code, self.message),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
