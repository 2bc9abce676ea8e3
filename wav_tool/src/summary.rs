use serde::Serialize;
use wav_core::PcmSampleBuffer;

/// What `wav-tool decode` reports about a decoded stream
#[derive(Debug, Serialize)]
pub struct DecodeSummary {
    pub sample_rate: u32,
    pub samples: usize,
    pub duration_ms: u64,
    pub peak: f32,
    pub rms: f32,
}

impl DecodeSummary {
    pub fn from_buffer(buffer: &PcmSampleBuffer) -> Self {
        Self {
            sample_rate: buffer.format().sample_rate_hz,
            samples: buffer.len(),
            duration_ms: buffer.duration().as_millis() as u64,
            peak: peak(buffer.samples()),
            rms: rms(buffer.samples()),
        }
    }
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}
