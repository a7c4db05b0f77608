//! Error types for udpcap

use thiserror::Error;

/// Result type alias for udpcap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for udpcap
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading payload or writing the capture
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input or output stream could not be opened
    #[error("can't open {stream}: {source}")]
    StreamOpen {
        stream: String,
        #[source]
        source: std::io::Error,
    },

    /// Payload larger than the frame builder accepts
    #[error("payload of {size} bytes exceeds the maximum of {max} bytes")]
    BufferOverflow { size: usize, max: usize },

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Configuration file could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Capture data that is truncated or not in pcap format
    #[error("Malformed capture: {0}")]
    Malformed(String),
}

impl Error {
    /// Create a stream-open error for the named stream
    pub fn stream_open<S: Into<String>>(stream: S, source: std::io::Error) -> Self {
        Error::StreamOpen {
            stream: stream.into(),
            source,
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-capture error with a custom message
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::Malformed(msg.into())
    }
}
