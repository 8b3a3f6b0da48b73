//! Length-framed record transport over a single TCP connection.
//!
//! Every message on the wire is `len16BE || payload`. One transfer
//! dialogue owns one connection; the connect deadline and the per-read
//! timeout come from configuration (15 s / 20 s by default).

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::codec::hex_bytes;
use crate::config::TransferConfig;
use crate::error::{MipError, Result};

use super::constants::MAX_FRAME_LEN;
use super::records::Frame;

/// A connected, length-framed MIP transport.
#[derive(Debug)]
pub struct FrameTransport {
    stream: TcpStream,
    read_timeout: Duration,
    protocol_debug: bool,
}

impl FrameTransport {
    /// Connect to the MIP within the configured connect deadline.
    pub async fn connect(
        host: &str,
        port: u16,
        config: &TransferConfig,
        protocol_debug: bool,
    ) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        let connect_deadline = Duration::from_secs(config.connect_timeout_secs);

        let stream = timeout(connect_deadline, TcpStream::connect(&addr))
            .await
            .map_err(|_| MipError::Timeout(format!("connecting to {}", addr)))?
            .map_err(|e| MipError::Network(format!("connect to {} failed: {}", addr, e)))?;

        debug!("Connected to {}", addr);
        Ok(Self {
            stream,
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            protocol_debug,
        })
    }

    /// Write one frame: 2-byte big-endian length, payload, flush.
    pub async fn write_framed(&mut self, payload: &[u8]) -> Result<()> {
        if payload.is_empty() || payload.len() > MAX_FRAME_LEN {
            return Err(MipError::Protocol(format!(
                "frame payload of {} bytes is outside 1..={}",
                payload.len(),
                MAX_FRAME_LEN
            )));
        }
        if self.protocol_debug {
            trace!("-> frame ({} bytes): {}", payload.len(), hex_bytes(payload));
        }

        let len = (payload.len() as u16).to_be_bytes();
        self.stream
            .write_all(&len)
            .await
            .map_err(|e| MipError::Network(format!("frame write failed: {}", e)))?;
        self.stream
            .write_all(payload)
            .await
            .map_err(|e| MipError::Network(format!("frame write failed: {}", e)))?;
        self.stream
            .flush()
            .await
            .map_err(|e| MipError::Network(format!("frame flush failed: {}", e)))?;
        Ok(())
    }

    /// Read one frame: exactly 2 length bytes, then exactly that many
    /// payload bytes. A peer close mid-frame is a truncation error; each
    /// read is bounded by the per-read timeout.
    pub async fn read_framed(&mut self) -> Result<Frame> {
        let mut len_buf = [0u8; 2];
        self.read_exact(&mut len_buf, "frame length").await?;
        let len = u16::from_be_bytes(len_buf) as usize;

        let mut payload = vec![0u8; len];
        if len > 0 {
            self.read_exact(&mut payload, "frame payload").await?;
        }

        if self.protocol_debug {
            trace!("<- frame ({} bytes): {}", len, hex_bytes(&payload));
        }
        Ok(Frame::new(payload))
    }

    async fn read_exact(&mut self, buf: &mut [u8], what: &str) -> Result<()> {
        match timeout(self.read_timeout, self.stream.read_exact(buf)).await {
            Err(_) => Err(MipError::Timeout(format!(
                "reading {} ({} bytes)",
                what,
                buf.len()
            ))),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(MipError::Network(format!(
                    "connection closed while reading {} ({} bytes expected)",
                    what,
                    buf.len()
                )))
            }
            Ok(Err(e)) => Err(MipError::Network(format!("read of {} failed: {}", what, e))),
            Ok(Ok(_)) => Ok(()),
        }
    }
}
