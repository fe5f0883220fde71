//! Error types for Ozma operations.
//!
//! One enum covers both sides of the codec: parameter validation and output
//! contract violations on the encoder side, and stream validation on the
//! decoder side.

use std::io;
use thiserror::Error;

/// The main error type for Ozma operations.
#[derive(Debug, Error)]
pub enum OzmaError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An encoder parameter is outside its documented range.
    #[error("parameter {param} = {value} out of range [{min}, {max}]")]
    ConfigOutOfRange {
        /// Name of the offending parameter.
        param: &'static str,
        /// The rejected value.
        value: u64,
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
    },

    /// The destination buffer cannot hold the minimum the call must write.
    ///
    /// Returned from the first `encode` call when the 13-byte stream header
    /// does not fit. The encoder keeps its header-pending state, so the call
    /// is retryable with a larger buffer.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    OutputBufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Invalid header format.
    #[error("invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Corrupted data in an LZMA stream.
    #[error("corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for Ozma operations.
pub type Result<T> = std::result::Result<T, OzmaError>;

impl OzmaError {
    /// Create a parameter-range error.
    pub fn config_out_of_range(param: &'static str, value: u64, min: u64, max: u64) -> Self {
        Self::ConfigOutOfRange {
            param,
            value,
            min,
            max,
        }
    }

    /// Create an output-buffer-too-small error.
    pub fn output_buffer_too_small(needed: usize, available: usize) -> Self {
        Self::OutputBufferTooSmall { needed, available }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OzmaError::config_out_of_range("lc", 12, 0, 8);
        assert!(err.to_string().contains("lc"));
        assert!(err.to_string().contains("[0, 8]"));

        let err = OzmaError::output_buffer_too_small(13, 4);
        assert!(err.to_string().contains("need 13"));

        let err = OzmaError::corrupted(42, "bad distance");
        assert!(err.to_string().contains("offset 42"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: OzmaError = io_err.into();
        assert!(matches!(err, OzmaError::Io(_)));
    }
}
