//! Streaming WAV decoding and WAV encoding for synthesized speech.
//!
//! Synthesis services return audio as a canonical PCM WAV body that
//! arrives incrementally. [`decode_wav`] consumes such a body through a
//! [`WavByteStream`] and materializes normalized `f32` samples;
//! [`encode_wav`] turns a sample buffer back into WAV bytes at 8, 16,
//! 32 or 64 bits per sample.

mod config;
mod decoder;
mod encoder;
mod error;
mod format;
mod header;
mod stream;

pub use config::{DecoderConfig, LengthPolicy, DEFAULT_CHUNK_SIZE};
pub use decoder::{decode_wav, decode_wav_with, DecoderState, StreamingPcmDecoder};
pub use encoder::{encode_wav, encode_wav_base64};
pub use error::{Result, WavError};
pub use format::{AudioFormatDescriptor, BitDepth, PcmSampleBuffer};
pub use header::{WavHeader, HEADER_LEN};
pub use stream::{
    AsyncReadStream, CancelHandle, CancelSignal, SliceStream, StreamError, WavByteStream,
};
