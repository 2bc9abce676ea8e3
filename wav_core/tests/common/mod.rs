//! Scripted byte streams and WAV builders shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use wav_core::{StreamError, WavByteStream, HEADER_LEN};

/// Build a canonical mono 16-bit WAV from raw sample values
pub fn mono16_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        data.extend_from_slice(&s.to_le_bytes());
    }
    wav_with_header(1, sample_rate, 16, data.len() as u32, &data)
}

/// Build a WAV whose header fields are set independently of the payload
pub fn wav_with_header(channels: u16, sample_rate: u32, bits: u16, data_len: u32, data: &[u8]) -> Vec<u8> {
    let block_align = channels * (bits / 8);
    let mut out = Vec::with_capacity(HEADER_LEN + data.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// Hands out bytes in a repeating pattern of read sizes
pub struct ChunkedStream {
    data: Vec<u8>,
    pos: usize,
    pattern: Vec<usize>,
    step: usize,
    pub reads: usize,
    pub reads_after_eof: usize,
}

impl ChunkedStream {
    pub fn new(data: Vec<u8>, pattern: Vec<usize>) -> Self {
        assert!(pattern.iter().all(|&n| n > 0), "read sizes must be positive");
        Self {
            data,
            pos: 0,
            pattern,
            step: 0,
            reads: 0,
            reads_after_eof: 0,
        }
    }

    pub fn byte_at_a_time(data: Vec<u8>) -> Self {
        Self::new(data, vec![1])
    }
}

#[async_trait]
impl WavByteStream for ChunkedStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        self.reads += 1;
        if self.pos == self.data.len() {
            self.reads_after_eof += 1;
            return Ok(0);
        }
        let want = self.pattern[self.step % self.pattern.len()];
        self.step += 1;
        let n = want.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        // Give other tasks a chance to run, like a real network read would
        tokio::task::yield_now().await;
        Ok(n)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Io,
    Cancel,
}

/// Delivers `fail_after` bytes, then fails every further read
pub struct FaultyStream {
    data: Vec<u8>,
    pos: usize,
    fail_after: usize,
    max_read: usize,
    fault: Fault,
}

impl FaultyStream {
    pub fn new(data: Vec<u8>, fail_after: usize, max_read: usize, fault: Fault) -> Self {
        Self {
            data,
            pos: 0,
            fail_after,
            max_read,
            fault,
        }
    }
}

#[async_trait]
impl WavByteStream for FaultyStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if self.pos >= self.fail_after {
            return Err(match self.fault {
                Fault::Io => StreamError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionAborted,
                    "connection dropped",
                )),
                Fault::Cancel => StreamError::Cancelled,
            });
        }
        let limit = self.fail_after.min(self.data.len());
        let n = buf.len().min(self.max_read).min(limit - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
