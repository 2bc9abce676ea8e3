//! Canonical 44-byte PCM WAV header.
//!
//! Fields are read at fixed offsets (RIFF, fmt and data chunks laid out
//! back to back). No chunk IDs are checked and no extension chunks are
//! walked.

use std::time::Duration;

use crate::error::{Result, WavError};
use crate::format::AudioFormatDescriptor;

pub const HEADER_LEN: usize = 44;

const CHANNELS_OFFSET: usize = 22;
const SAMPLE_RATE_OFFSET: usize = 24;
const BITS_PER_SAMPLE_OFFSET: usize = 34;
const DATA_LEN_OFFSET: usize = 40;

/// Fields extracted from a canonical WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channel_count: u16,
    pub bits_per_sample: u16,
    pub sample_rate_hz: u32,
    pub data_byte_length: u32,
}

impl WavHeader {
    /// Parse the first 44 bytes of a WAV stream
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(WavError::malformed(format!(
                "header needs {HEADER_LEN} bytes, got {}",
                data.len()
            )));
        }

        let header = WavHeader {
            channel_count: read_u16(data, CHANNELS_OFFSET),
            bits_per_sample: read_u16(data, BITS_PER_SAMPLE_OFFSET),
            sample_rate_hz: read_u32(data, SAMPLE_RATE_OFFSET),
            data_byte_length: read_u32(data, DATA_LEN_OFFSET),
        };
        header.check_consistency()?;

        tracing::debug!(
            channels = header.channel_count,
            bits = header.bits_per_sample,
            sample_rate = header.sample_rate_hz,
            data_len = header.data_byte_length,
            "parsed WAV header"
        );
        Ok(header)
    }

    // Both fields are signed 32-bit on the wire in common writers; a set
    // sign bit means a negative length or rate.
    fn check_consistency(&self) -> Result<()> {
        if self.sample_rate_hz == 0 || self.sample_rate_hz > i32::MAX as u32 {
            return Err(WavError::malformed(format!(
                "invalid sample rate {}",
                self.sample_rate_hz
            )));
        }
        if self.data_byte_length > i32::MAX as u32 {
            return Err(WavError::malformed(format!(
                "negative data length {}",
                self.data_byte_length as i32
            )));
        }
        Ok(())
    }

    pub fn format(&self) -> AudioFormatDescriptor {
        AudioFormatDescriptor {
            sample_rate_hz: self.sample_rate_hz,
            channel_count: self.channel_count,
            bits_per_sample: self.bits_per_sample,
        }
    }

    /// Samples declared by the data chunk (all channels)
    pub fn sample_count(&self) -> usize {
        let bytes_per_sample = (self.bits_per_sample / 8).max(1) as usize;
        self.data_byte_length as usize / bytes_per_sample
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate_hz == 0 {
            return Duration::ZERO;
        }
        let frames = self.sample_count() / self.channel_count.max(1) as usize;
        Duration::from_secs_f64(frames as f64 / self.sample_rate_hz as f64)
    }
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(channels: u16, rate: u32, bits: u16, data_len: u32) -> Vec<u8> {
        let mut h = vec![0u8; HEADER_LEN];
        h[0..4].copy_from_slice(b"RIFF");
        h[8..12].copy_from_slice(b"WAVE");
        h[12..16].copy_from_slice(b"fmt ");
        h[22..24].copy_from_slice(&channels.to_le_bytes());
        h[24..28].copy_from_slice(&rate.to_le_bytes());
        h[34..36].copy_from_slice(&bits.to_le_bytes());
        h[36..40].copy_from_slice(b"data");
        h[40..44].copy_from_slice(&data_len.to_le_bytes());
        h
    }

    #[test]
    fn test_parse_fixed_offsets() {
        let header = WavHeader::parse(&header_bytes(1, 24000, 16, 48000)).unwrap();
        assert_eq!(header.channel_count, 1);
        assert_eq!(header.sample_rate_hz, 24000);
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.data_byte_length, 48000);
        assert_eq!(header.sample_count(), 24000);
        assert_eq!(header.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_chunk_ids_are_not_checked() {
        let mut bytes = header_bytes(1, 16000, 16, 10);
        bytes[0..4].copy_from_slice(b"JUNK");
        assert!(WavHeader::parse(&bytes).is_ok());
    }

    #[test]
    fn test_short_header_is_malformed() {
        let bytes = header_bytes(1, 16000, 16, 10);
        let result = WavHeader::parse(&bytes[..43]);
        assert!(matches!(result, Err(WavError::MalformedHeader(_))));
    }

    #[test]
    fn test_negative_lengths_are_malformed() {
        let result = WavHeader::parse(&header_bytes(1, 16000, 16, 0x8000_0000));
        assert!(matches!(result, Err(WavError::MalformedHeader(_))));

        let result = WavHeader::parse(&header_bytes(1, 0, 16, 10));
        assert!(matches!(result, Err(WavError::MalformedHeader(_))));
    }

    #[test]
    fn test_odd_data_length_rounds_down() {
        let header = WavHeader::parse(&header_bytes(1, 8000, 16, 11)).unwrap();
        assert_eq!(header.sample_count(), 5);
    }
}
