//! Unified error type.

use std::num::ParseIntError;

use thiserror::Error;

use crate::legacy::Capability;

/// The error type returned by reqbridge's fallible operations.
///
/// Malformed cookies and malformed query pairs never surface here: those
/// degrade to an empty cookie set and a dropped pair respectively.
#[derive(Debug, Error)]
pub enum Error {
    /// The request target could not be turned into a well-formed URI.
    #[error("invalid request uri `{input}`: {source}")]
    InvalidUri {
        input: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    /// A date header was present but not in HTTP date format.
    #[error("invalid date header value `{value}`: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A header read as an integer did not hold one.
    #[error("invalid numeric header value `{value}`: {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A mutation the transport has no backing store for.
    #[error("unsupported operation: {0}")]
    Unsupported(Capability),

    /// The request body could not be buffered.
    #[error("body: {0}")]
    Body(String),

    /// Binding to a port or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
