//! Byte sources for the streaming decoder.
//!
//! The decoder only needs one capability from its transport: "read up to
//! N bytes, possibly suspending, possibly cancelled". `WavByteStream`
//! captures exactly that, so the decoder can be driven by a tokio reader
//! (file, socket, HTTP body) or by an in-memory payload in tests.

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::watch;

/// Failure of a single read
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("read cancelled")]
    Cancelled,

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Sequential, single-consumer byte source.
///
/// A read returns between 0 and `buf.len()` bytes; 0 means end of stream.
#[async_trait]
pub trait WavByteStream: Send {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;
}

#[async_trait]
impl<S: WavByteStream + ?Sized> WavByteStream for Box<S> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        (**self).read(buf).await
    }
}

#[async_trait]
impl<S: WavByteStream + ?Sized> WavByteStream for &mut S {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        (**self).read(buf).await
    }
}

/// Owner side of a cooperative cancellation pair
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation pair, checked at every read
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Adapts any tokio reader into a `WavByteStream`
pub struct AsyncReadStream<R> {
    reader: R,
    cancel: Option<CancelSignal>,
}

impl<R> AsyncReadStream<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            cancel: None,
        }
    }

    /// Race every read against `signal`
    pub fn with_cancel(reader: R, signal: CancelSignal) -> Self {
        Self {
            reader,
            cancel: Some(signal),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait]
impl<R> WavByteStream for AsyncReadStream<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let Self { reader, cancel } = self;
        match cancel {
            None => Ok(reader.read(buf).await?),
            Some(signal) => {
                if signal.is_cancelled() {
                    return Err(StreamError::Cancelled);
                }
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => Err(StreamError::Cancelled),
                    res = reader.read(buf) => Ok(res?),
                }
            }
        }
    }
}

/// In-memory stream that hands out at most `max_read` bytes per read
#[derive(Debug, Clone)]
pub struct SliceStream {
    data: Vec<u8>,
    pos: usize,
    max_read: usize,
}

impl SliceStream {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            max_read: usize::MAX,
        }
    }

    pub fn with_max_read(data: impl Into<Vec<u8>>, max_read: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            max_read: max_read.max(1),
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

#[async_trait]
impl WavByteStream for SliceStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let n = buf.len().min(self.max_read).min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
