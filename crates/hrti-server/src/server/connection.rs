// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Length-prefixed JSON framing.
//!
//! A frame is a 4-byte big-endian body length followed by the JSON body.
//! Reading and writing are split so a connection can read requests in one
//! task while another pushes responses and callbacks.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reading half of a framed connection.
pub struct FrameReader<R> {
    inner: R,
    max_message_size: usize,
    read_buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, max_message_size: usize) -> Self {
        Self {
            inner,
            max_message_size,
            read_buffer: Vec::with_capacity(4096),
        }
    }

    /// Read one frame.
    ///
    /// Returns `Ok(None)` if the peer closed the connection between frames.
    /// A body that is not valid JSON for `M` yields [`ConnectionError::Decode`]
    /// and leaves the stream positioned at the next frame.
    pub async fn read_frame<M: DeserializeOwned>(&mut self) -> Result<Option<M>, ConnectionError> {
        let mut len_buf = [0u8; 4];
        match self.inner.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None); // Connection closed
            }
            Err(e) => return Err(ConnectionError::Io(e.to_string())),
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len == 0 {
            return Err(ConnectionError::Protocol("Empty frame".into()));
        }
        if len > self.max_message_size {
            return Err(ConnectionError::Protocol(format!(
                "Frame too large: {} > {}",
                len, self.max_message_size
            )));
        }

        self.read_buffer.clear();
        self.read_buffer.resize(len, 0);
        self.inner
            .read_exact(&mut self.read_buffer)
            .await
            .map_err(|e| ConnectionError::Io(e.to_string()))?;

        serde_json::from_slice(&self.read_buffer)
            .map(Some)
            .map_err(|e| ConnectionError::Decode(e.to_string()))
    }
}

/// Writing half of a framed connection.
pub struct FrameWriter<W> {
    inner: W,
    max_message_size: usize,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W, max_message_size: usize) -> Self {
        Self {
            inner,
            max_message_size,
        }
    }

    /// Serialize and send one frame.
    ///
    /// A frame over the size limit yields [`ConnectionError::Oversized`]
    /// before anything is written.
    pub async fn write_frame<M: Serialize>(&mut self, msg: &M) -> Result<(), ConnectionError> {
        let json = serde_json::to_vec(msg)
            .map_err(|e| ConnectionError::Protocol(format!("Serialize error: {}", e)))?;

        if json.len() > self.max_message_size {
            return Err(ConnectionError::Oversized {
                size: json.len(),
                max: self.max_message_size,
            });
        }

        let len = json.len() as u32;
        self.inner
            .write_all(&len.to_be_bytes())
            .await
            .map_err(|e| ConnectionError::Io(e.to_string()))?;
        self.inner
            .write_all(&json)
            .await
            .map_err(|e| ConnectionError::Io(e.to_string()))?;
        self.inner
            .flush()
            .await
            .map_err(|e| ConnectionError::Io(e.to_string()))
    }
}

/// Connection error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// The frame was read whole but its body did not parse.
    #[error("Decode error: {0}")]
    Decode(String),
    /// An outgoing frame exceeded the size limit and was not sent.
    #[error("Frame too large: {size} > {max}")]
    Oversized { size: usize, max: usize },
}

impl ConnectionError {
    /// Whether the stream is still aligned on a frame boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Oversized { .. })
    }
}
