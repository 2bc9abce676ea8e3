//! Streaming decoder for mono 16-bit PCM WAV.
//!
//! The decoder reads the 44-byte header, validates the format, then pulls
//! the data chunk in fixed-size reads until the stream reports end of
//! stream. Reads may end on an odd byte; in that case one extra 1-byte
//! read completes the trailing frame before the chunk is converted, so
//! the output is identical however the transport partitions the bytes.

use tracing::{debug, warn};

use crate::config::{DecoderConfig, LengthPolicy};
use crate::error::{Result, WavError};
use crate::format::{AudioFormatDescriptor, PcmSampleBuffer};
use crate::header::{WavHeader, HEADER_LEN};
use crate::stream::WavByteStream;

const BYTES_PER_SAMPLE: usize = 2;
const I16_SCALE: f32 = 32768.0;

// Headers from streaming servers can declare far more data than ever
// arrives; reserve at most this many samples up front.
const MAX_PREALLOC_SAMPLES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    AwaitingHeader,
    ValidatingFormat,
    StreamingData,
    Complete,
    Failed,
}

/// Single-use decoder over one byte stream
pub struct StreamingPcmDecoder<S> {
    stream: S,
    config: DecoderConfig,
    state: DecoderState,
    output: Option<Vec<f32>>,
}

impl<S: WavByteStream> StreamingPcmDecoder<S> {
    pub fn new(stream: S, config: DecoderConfig) -> Self {
        Self {
            stream,
            config,
            state: DecoderState::AwaitingHeader,
            output: None,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Whether a (partial) sample buffer is currently allocated
    pub fn holds_buffer(&self) -> bool {
        self.output.is_some()
    }

    pub fn into_stream(self) -> S {
        self.stream
    }

    /// Drive the stream to completion and return the decoded samples.
    ///
    /// On any failure the partial buffer is released and the decoder
    /// ends in `DecoderState::Failed`. Cancellation surfaces as
    /// `WavError::Cancelled`, never as `WavError::Io`.
    pub async fn decode(&mut self) -> Result<PcmSampleBuffer> {
        if self.state != DecoderState::AwaitingHeader {
            return Err(WavError::AlreadyConsumed);
        }

        match self.run().await {
            Ok(buffer) => {
                self.state = DecoderState::Complete;
                Ok(buffer)
            }
            Err(err) => {
                self.output = None;
                if err.is_cancelled() {
                    debug!(state = ?self.state, "WAV decode cancelled");
                } else {
                    debug!(state = ?self.state, error = %err, "WAV decode failed");
                }
                self.state = DecoderState::Failed;
                Err(err)
            }
        }
    }

    async fn run(&mut self) -> Result<PcmSampleBuffer> {
        let mut raw = [0u8; HEADER_LEN];
        let got = read_up_to(&mut self.stream, &mut raw).await?;
        if got < HEADER_LEN {
            return Err(WavError::malformed(format!(
                "stream ended after {got} of {HEADER_LEN} header bytes"
            )));
        }
        let header = WavHeader::parse(&raw)?;

        self.state = DecoderState::ValidatingFormat;
        if header.channel_count != 1 || header.bits_per_sample != 16 {
            return Err(WavError::UnsupportedFormat {
                channels: header.channel_count,
                bits_per_sample: header.bits_per_sample,
            });
        }
        if let Some(limit) = self.config.max_data_bytes {
            if header.data_byte_length > limit {
                return Err(WavError::malformed(format!(
                    "declared data length {} exceeds limit {limit}",
                    header.data_byte_length
                )));
            }
        }
        let declared = header.data_byte_length as usize / BYTES_PER_SAMPLE;
        let output = self
            .output
            .insert(Vec::with_capacity(declared.min(MAX_PREALLOC_SAMPLES)));

        self.state = DecoderState::StreamingData;
        let chunk_size = self.config.effective_chunk_size();
        // One spare byte for completing an odd read
        let mut read_buf = vec![0u8; chunk_size + 1];
        let mut chunks = 0usize;
        // Samples the stream delivered; only the first `declared` are kept
        let mut delivered = 0usize;

        loop {
            let mut n = self.stream.read(&mut read_buf[..chunk_size]).await?;
            if n == 0 {
                break;
            }
            if n % 2 != 0 {
                let extra = self.stream.read(&mut read_buf[n..n + 1]).await?;
                if extra == 0 {
                    return Err(WavError::TruncatedData {
                        sample_offset: delivered + n / 2,
                    });
                }
                n += extra;
            }

            let room = declared - output.len();
            output.extend(
                read_buf[..n]
                    .chunks_exact(BYTES_PER_SAMPLE)
                    .take(room)
                    .map(|frame| i16::from_le_bytes([frame[0], frame[1]]) as f32 / I16_SCALE),
            );
            delivered += n / BYTES_PER_SAMPLE;
            chunks += 1;
        }

        let mut samples = self.output.take().unwrap_or_default();
        let actual = delivered;
        debug!(
            sample_rate = header.sample_rate_hz,
            declared,
            actual,
            chunks,
            "decoded WAV data chunk"
        );

        if actual != declared {
            match self.config.length_policy {
                LengthPolicy::Strict => {
                    return Err(WavError::LengthMismatch { declared, actual });
                }
                LengthPolicy::Lenient if actual < declared => {
                    warn!(declared, actual, "WAV stream shorter than header, padding with silence");
                    samples.resize(declared, 0.0);
                }
                LengthPolicy::Lenient => {
                    warn!(declared, actual, "WAV stream longer than header, dropped extra samples");
                }
            }
        }

        Ok(PcmSampleBuffer::new(
            samples,
            AudioFormatDescriptor::mono_16bit(header.sample_rate_hz),
        ))
    }
}

/// Fill `buf` from the stream, stopping early only at end of stream
async fn read_up_to<S: WavByteStream + ?Sized>(stream: &mut S, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Decode a mono 16-bit WAV stream with the default configuration
pub async fn decode_wav<S: WavByteStream>(stream: S) -> Result<PcmSampleBuffer> {
    decode_wav_with(stream, DecoderConfig::default()).await
}

pub async fn decode_wav_with<S: WavByteStream>(
    stream: S,
    config: DecoderConfig,
) -> Result<PcmSampleBuffer> {
    StreamingPcmDecoder::new(stream, config).decode().await
}
