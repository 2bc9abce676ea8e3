//! wav-tool - decode and re-encode synthesized speech WAV files
//!
//! ```bash
//! # Stream a mono 16-bit WAV through the decoder and print a JSON summary
//! wav-tool decode speech.wav
//! curl -s http://localhost:50021/synthesis ... | wav-tool decode -
//!
//! # Re-encode at another bit depth
//! wav-tool transcode speech.wav speech32.wav --bits 32
//! ```

mod summary;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncRead;
use tracing::{info, warn};
use wav_core::{
    decode_wav_with, encode_wav, encode_wav_base64, AsyncReadStream, AudioFormatDescriptor,
    CancelHandle, DecoderConfig, LengthPolicy, PcmSampleBuffer, WavError,
};

use crate::summary::DecodeSummary;

#[derive(Parser, Debug)]
#[command(name = "wav-tool")]
#[command(about = "Decode and encode canonical PCM WAV streams", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Fail when the data chunk length differs from the header
    #[arg(long, global = true)]
    strict: bool,

    /// Read size for the data chunk in bytes
    #[arg(long, global = true)]
    chunk_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a mono 16-bit WAV and print a JSON summary
    Decode {
        /// Input file, or `-` for stdin
        input: String,

        /// Compact JSON output
        #[arg(short, long)]
        compact: bool,
    },
    /// Decode a mono 16-bit WAV and write it back out
    Transcode {
        /// Input file, or `-` for stdin
        input: String,

        /// Output file; omit with --base64 to print to stdout
        output: Option<PathBuf>,

        /// Output bits per sample (8, 16, 32 or 64)
        #[arg(short, long, default_value_t = 16)]
        bits: u16,

        /// Output sample rate; defaults to the input rate
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Emit Base64 instead of raw bytes
        #[arg(long)]
        base64: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    async_main(Args::parse()).await
}

async fn async_main(args: Args) -> anyhow::Result<()> {
    let mut config = DecoderConfig::from_env();
    if args.strict {
        config.length_policy = LengthPolicy::Strict;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }

    match args.command {
        Command::Decode { input, compact } => {
            let buffer = decode_input(&input, config).await?;
            let summary = DecodeSummary::from_buffer(&buffer);
            let json = if compact {
                serde_json::to_string(&summary)?
            } else {
                serde_json::to_string_pretty(&summary)?
            };
            println!("{json}");
        }
        Command::Transcode {
            input,
            output,
            bits,
            sample_rate,
            base64,
        } => {
            let buffer = decode_input(&input, config).await?;
            let format = AudioFormatDescriptor {
                sample_rate_hz: sample_rate.unwrap_or(buffer.format().sample_rate_hz),
                channel_count: 1,
                bits_per_sample: bits,
            };
            write_output(&buffer, &format, output, base64).await?;
        }
    }

    Ok(())
}

async fn open_input(input: &str) -> anyhow::Result<Box<dyn AsyncRead + Unpin + Send>> {
    if input == "-" {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(input)
        .await
        .with_context(|| format!("Failed to open {input}"))?;
    Ok(Box::new(file))
}

async fn decode_input(input: &str, config: DecoderConfig) -> anyhow::Result<PcmSampleBuffer> {
    let reader = open_input(input).await?;

    let cancel = CancelHandle::new();
    let stream = AsyncReadStream::with_cancel(reader, cancel.signal());
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling decode");
            cancel.cancel();
        }
    });

    let result = decode_wav_with(stream, config).await;
    ctrl_c.abort();

    match result {
        Ok(buffer) => {
            info!(
                samples = buffer.len(),
                sample_rate = buffer.format().sample_rate_hz,
                "Decoded {input}"
            );
            Ok(buffer)
        }
        Err(WavError::Cancelled) => anyhow::bail!("Decoding {input} was cancelled"),
        Err(e) => Err(e).with_context(|| format!("Failed to decode {input}")),
    }
}

async fn write_output(
    buffer: &PcmSampleBuffer,
    format: &AudioFormatDescriptor,
    output: Option<PathBuf>,
    base64: bool,
) -> anyhow::Result<()> {
    if base64 {
        let encoded = encode_wav_base64(buffer, format)?;
        match output {
            Some(path) => tokio::fs::write(&path, encoded)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => println!("{encoded}"),
        }
        return Ok(());
    }

    let path = output.context("an output path is required unless --base64 is given")?;
    let wav = encode_wav(buffer, format)?;
    tokio::fs::write(&path, &wav)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
        bytes = wav.len(),
        bits = format.bits_per_sample,
        "Wrote {}",
        path.display()
    );
    Ok(())
}
