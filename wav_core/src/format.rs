//! Sample buffer and format types shared by the decoder and encoder.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WavError};

/// Bit depths the encoder knows how to quantize to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum BitDepth {
    Eight,
    Sixteen,
    ThirtyTwo,
    SixtyFour,
}

impl BitDepth {
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::ThirtyTwo => 32,
            BitDepth::SixtyFour => 64,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        self.bits() as usize / 8
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = WavError;

    fn try_from(bits: u16) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            32 => Ok(BitDepth::ThirtyTwo),
            64 => Ok(BitDepth::SixtyFour),
            other => Err(WavError::UnsupportedBitDepth(other)),
        }
    }
}

impl From<BitDepth> for u16 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

/// Format of a sample buffer, independent of how it was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormatDescriptor {
    pub sample_rate_hz: u32,
    pub channel_count: u16,
    pub bits_per_sample: u16,
}

impl AudioFormatDescriptor {
    /// The only layout the streaming decoder accepts
    pub fn mono_16bit(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz,
            channel_count: 1,
            bits_per_sample: 16,
        }
    }

    /// Check the invariants the WAV header fields depend on.
    pub fn validate(&self) -> Result<BitDepth> {
        if self.sample_rate_hz == 0 {
            return Err(WavError::InvalidDescriptor("sample rate must be positive".into()));
        }
        if self.channel_count == 0 {
            return Err(WavError::InvalidDescriptor("channel count must be positive".into()));
        }
        BitDepth::try_from(self.bits_per_sample)
    }

    pub fn block_align(&self) -> u32 {
        self.channel_count as u32 * self.bits_per_sample as u32 / 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate_hz.saturating_mul(self.block_align())
    }
}

/// Normalized samples in [-1.0, 1.0], interleaved when there is more than one channel
#[derive(Debug, Clone, PartialEq)]
pub struct PcmSampleBuffer {
    samples: Vec<f32>,
    format: AudioFormatDescriptor,
}

impl PcmSampleBuffer {
    pub fn new(samples: Vec<f32>, format: AudioFormatDescriptor) -> Self {
        Self { samples, format }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn format(&self) -> &AudioFormatDescriptor {
        &self.format
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of per-channel frames
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.format.channel_count.max(1) as usize
    }

    pub fn duration(&self) -> Duration {
        if self.format.sample_rate_hz == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.format.sample_rate_hz as f64)
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
