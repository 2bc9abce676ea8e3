use base64::{engine::general_purpose, Engine as _};

use crate::error::{Result, WavError};
use crate::format::{AudioFormatDescriptor, BitDepth, PcmSampleBuffer};
use crate::header::HEADER_LEN;

const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_SIZE: u32 = 16;

/// Encode normalized samples as a canonical linear-PCM WAV (RIFF) file.
///
/// `format` decides the header fields and the quantization; the samples
/// are taken from `buffer` as interleaved frames of `format.channel_count`.
pub fn encode_wav(buffer: &PcmSampleBuffer, format: &AudioFormatDescriptor) -> Result<Vec<u8>> {
    let depth = format.validate()?;
    let samples = buffer.samples();
    let channels = format.channel_count as usize;
    if samples.len() % channels != 0 {
        return Err(WavError::InvalidDescriptor(format!(
            "{} samples do not form whole {channels}-channel frames",
            samples.len()
        )));
    }

    let frames = samples.len() / channels;
    let data_len = frames * channels * depth.bytes_per_sample();
    let data_size = u32::try_from(data_len)
        .ok()
        .filter(|&n| n <= u32::MAX - 36)
        .ok_or_else(|| {
            WavError::InvalidDescriptor(format!("{data_len} data bytes do not fit a WAV file"))
        })?;
    let byte_rate = format
        .sample_rate_hz
        .checked_mul(format.block_align())
        .ok_or_else(|| WavError::InvalidDescriptor("byte rate overflows u32".into()))?;
    let block_align = u16::try_from(format.block_align())
        .map_err(|_| WavError::InvalidDescriptor("block align overflows u16".into()))?;

    let mut out = Vec::<u8>::with_capacity(HEADER_LEN + data_len);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&format.channel_count.to_le_bytes());
    out.extend_from_slice(&format.sample_rate_hz.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        write_sample(&mut out, s, depth);
    }

    tracing::debug!(
        frames,
        channels,
        bits = depth.bits(),
        bytes = out.len(),
        "encoded WAV"
    );
    Ok(out)
}

/// Encode as WAV and return Base64.
pub fn encode_wav_base64(buffer: &PcmSampleBuffer, format: &AudioFormatDescriptor) -> Result<String> {
    let wav = encode_wav(buffer, format)?;
    Ok(general_purpose::STANDARD.encode(wav))
}

// Signed integer quantization with rounding; 64-bit is a full 8-byte integer
fn write_sample(out: &mut Vec<u8>, sample: f32, depth: BitDepth) {
    let s = sample.clamp(-1.0, 1.0) as f64;
    match depth {
        BitDepth::Eight => out.push((s * i8::MAX as f64).round() as i8 as u8),
        BitDepth::Sixteen => {
            out.extend_from_slice(&((s * i16::MAX as f64).round() as i16).to_le_bytes())
        }
        BitDepth::ThirtyTwo => {
            out.extend_from_slice(&((s * i32::MAX as f64).round() as i32).to_le_bytes())
        }
        BitDepth::SixtyFour => {
            out.extend_from_slice(&((s * i64::MAX as f64).round() as i64).to_le_bytes())
        }
    }
}
