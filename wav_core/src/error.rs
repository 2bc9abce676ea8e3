use thiserror::Error;

use crate::stream::StreamError;

pub type Result<T> = std::result::Result<T, WavError>;

/// Errors raised while decoding or encoding WAV data
#[derive(Debug, Error)]
pub enum WavError {
    #[error("Malformed WAV header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported WAV format: {channels} channel(s), {bits_per_sample}-bit (only mono 16-bit is decodable)")]
    UnsupportedFormat { channels: u16, bits_per_sample: u16 },

    #[error("Unsupported bit depth: {0} (expected 8, 16, 32 or 64)")]
    UnsupportedBitDepth(u16),

    #[error("Invalid audio format: {0}")]
    InvalidDescriptor(String),

    #[error("WAV data decode failed: {0}")]
    Io(#[source] std::io::Error),

    #[error("Decoder has already consumed its stream")]
    AlreadyConsumed,

    #[error("WAV decode cancelled")]
    Cancelled,

    #[error("Stream ended inside a sample frame after {sample_offset} samples")]
    TruncatedData { sample_offset: usize },

    #[error("Data length mismatch: header declares {declared} samples, stream delivered {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}

impl WavError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        WavError::MalformedHeader(msg.into())
    }

    /// True when the failure came from a cancellation signal rather than a broken stream
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WavError::Cancelled)
    }
}

impl From<StreamError> for WavError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Cancelled => WavError::Cancelled,
            StreamError::Io(e) => WavError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_not_io() {
        let err: WavError = StreamError::Cancelled.into();
        assert!(err.is_cancelled());
        assert!(!matches!(err, WavError::Io(_)));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
        let err: WavError = StreamError::Io(io).into();
        assert!(!err.is_cancelled());
        let source = err.source().expect("io source");
        assert!(source.to_string().contains("peer reset"));
    }
}
