//! Error types for protocol decoding.

use thiserror::Error;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors that can occur while decoding a frame.
///
/// [`ProtoError::UnknownCategory`] and [`ProtoError::UnknownMessage`] are
/// recoverable skips: the pipeline logs them and drops the frame without
/// touching the connection. Every other variant is a malformed frame, which
/// is also dropped without closing the connection.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Frame body too short to carry category, type, and the common header.
    #[error("frame body too short: {len} bytes")]
    ShortFrame {
        /// Observed body length.
        len: usize,
    },

    /// Category code not in the protocol.
    #[error("unknown message category {0:#04x}")]
    UnknownCategory(u8),

    /// No schema registered for this (category, type) pair.
    #[error("unknown message type {msg_type:#04x} in category {category:#04x}")]
    UnknownMessage {
        /// Wire category code.
        category: u8,
        /// Wire type code.
        msg_type: u8,
    },

    /// Timestamp field was not exactly 14 characters.
    #[error("timestamp field has {len} characters, expected 14")]
    BadTimestamp {
        /// Observed character count.
        len: usize,
    },

    /// A declared fixed-width field ran past the end of the frame body.
    #[error("field '{field}' truncated: needs {width} bytes, {remaining} left")]
    Truncated {
        /// Schema field name.
        field: &'static str,
        /// Declared field width.
        width: usize,
        /// Bytes remaining in the body.
        remaining: usize,
    },

    /// An ASCII-hex field contained non-hex characters.
    #[error("field '{field}' is not valid ASCII-hex")]
    InvalidHex {
        /// Schema field name.
        field: &'static str,
    },

    /// A text field contained bytes that are not valid UTF-8.
    #[error("field '{field}' is not valid UTF-8")]
    InvalidText {
        /// Schema field name.
        field: &'static str,
    },

    /// An ASCII-hex integer decoded to more than four bytes.
    #[error("field '{field}' decodes to {bytes} bytes, max 4 for an integer")]
    IntegerOverflow {
        /// Schema field name.
        field: &'static str,
        /// Decoded byte count.
        bytes: usize,
    },
}

impl ProtoError {
    /// True for the unrecognised-message variants that are silently skipped
    /// rather than reported as malformed frames.
    #[must_use]
    pub const fn is_unknown_message(&self) -> bool {
        matches!(
            self,
            Self::UnknownCategory(_) | Self::UnknownMessage { .. }
        )
    }
}
