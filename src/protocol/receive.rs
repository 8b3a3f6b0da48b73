//! Receive dialogue: fetch an IPM file FROM Mastercard.
//!
//! Each attempt opens a fresh connection, sends a 101 request and
//! classifies the first response. When the requested sequence number is
//! not available the scan advances the sequence up to 99 before giving
//! up. Data records are written through a tolerant extractor that copes
//! with peers wrapping frames in an extra RDW or a stray 0xFF pad byte.

use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::codec::hex_bytes;
use crate::config::Config;
use crate::error::{MipError, Result};

use super::constants::*;
use super::records::{self, check_ack, Frame};
use super::transport::FrameTransport;
use super::txid::TransmissionId;

/// Outcome of a completed receive.
#[derive(Debug)]
pub struct ReceiveSummary {
    /// Data frames received (excluding header and trailer)
    pub frames_received: u32,
    /// Payload bytes written to the destination file
    pub bytes_written: u64,
    /// Sequence number that produced the transmission
    pub sequence_used: u32,
    /// Transmission ID reported by the MIP (or the requested one when the
    /// peer acknowledged without a header)
    pub tx_id: String,
}

/// How one scan attempt ended.
enum Attempt {
    /// Transfer completed
    Received(ReceiveSummary),
    /// This sequence is not available; reason kept for the final report
    Unavailable(String),
}

/// Receive transmission `tx_id` from the MIP into `dest`.
///
/// Scans sequence numbers from the one in `tx_id` through 99. Network
/// failures (refused, reset, timeout, short read) terminate the scan
/// immediately; only per-sequence rejections advance it.
pub async fn receive_file(
    host: &str,
    port: u16,
    dest: &Path,
    tx_id: &TransmissionId,
    config: &Config,
) -> Result<ReceiveSummary> {
    let first_seq = tx_id.sequence()?;
    info!(
        "Receiving {} from {}:{} into {} (scanning sequences {:02}-{})",
        tx_id,
        host,
        port,
        dest.display(),
        first_seq,
        MAX_SEQUENCE
    );

    let mut last_error: Option<String> = None;
    for seq in first_seq..=MAX_SEQUENCE {
        let try_id = tx_id.with_sequence(seq);
        if seq > first_seq {
            info!("Trying sequence {:02}: {}", seq, try_id);
        }

        match attempt(host, port, dest, &try_id, seq, config).await? {
            Attempt::Received(summary) => {
                info!(
                    "Receive completed: {} frames, {} bytes, sequence {:02}",
                    summary.frames_received, summary.bytes_written, summary.sequence_used
                );
                return Ok(summary);
            }
            Attempt::Unavailable(reason) => {
                debug!("Sequence {:02} unavailable: {}", seq, reason);
                last_error = Some(reason);
            }
        }
    }

    Err(MipError::NotFound(format!(
        "no transmission available for {}XX (sequences {:02}-{}). Last error: {}",
        tx_id.prefix12(),
        first_seq,
        MAX_SEQUENCE,
        last_error.unwrap_or_else(|| "none reported".to_string())
    )))
}

/// One connection, one sequence number.
async fn attempt(
    host: &str,
    port: u16,
    dest: &Path,
    try_id: &TransmissionId,
    seq: u32,
    config: &Config,
) -> Result<Attempt> {
    let mut transport = FrameTransport::connect(
        host,
        port,
        &config.transfer,
        config.logging.protocol_debug,
    )
    .await?;

    transport.write_framed(&records::request_101(try_id)).await?;
    let first = transport.read_framed().await?;

    // Classify the response in the header slot
    let (rx_tx_id, expected_blocks) = match first.code().as_str() {
        CODE_TRAILER => {
            let rc = first.as_ebcdic(5, 2);
            if rc != RETURN_CODE_OK {
                let mut reason = format!("transmission not available (rc={})", rc);
                let detail_len = first.data.len().saturating_sub(7).min(80);
                let detail = first.as_ebcdic(7, detail_len);
                let detail = detail.trim();
                if !detail.is_empty() {
                    reason.push_str(" - ");
                    reason.push_str(detail);
                }
                return Ok(Attempt::Unavailable(reason));
            }
            // Positive 998 without a header: the request was accepted and
            // data follows; fall back to the requested ID
            debug!("Request acknowledged without 004 header");
            (try_id.as_str().to_string(), None)
        }
        CODE_HEADER => {
            let rx = first.as_ebcdic(5, 14);
            let blocks = first.as_u32(36, 4);
            info!("Header 004: transmission {} ({} blocks expected)", rx, blocks);
            (rx, Some(blocks))
        }
        other => {
            return Ok(Attempt::Unavailable(format!(
                "unexpected response code '{}' (raw={})",
                other,
                first.hex()
            )));
        }
    };

    // Data loop
    let mut file = File::create(dest).await?;
    let mut frames_received = 0u32;
    let mut bytes_written = 0u64;
    loop {
        let frame = transport.read_framed().await?;

        if frame.code() == CODE_TRAILER {
            let rc = frame.as_ebcdic(5, 2);
            if rc != RETURN_CODE_OK {
                return Err(MipError::Protocol(format!(
                    "trailer carries error rc={}",
                    rc
                )));
            }
            let trailer_count = frame.as_u32(7, 4);
            let expected = frames_received + 1;
            if trailer_count != expected {
                warn!(
                    "Trailer count mismatch: expected {}, trailer says {}",
                    expected, trailer_count
                );
            }
            debug!("Trailer 998 OK, count {}", trailer_count);
            break;
        }

        let offset = payload_offset(&frame);
        let payload = frame.data.get(offset + 1..).unwrap_or(&[]);
        file.write_all(payload).await?;
        frames_received += 1;
        bytes_written += payload.len() as u64;
        if frames_received % 10 == 0 {
            debug!("Received {} data frames", frames_received);
        }
    }
    file.flush().await?;

    if let Some(expected) = expected_blocks {
        debug!(
            "Header announced {} blocks, received {} data frames",
            expected, frames_received
        );
    }

    // Authorise purge of the received transmission
    transport.write_framed(&records::purge_999(&rx_tx_id)).await?;
    let ack = transport.read_framed().await?;
    check_ack("Purge 999", &ack)?;

    Ok(Attempt::Received(ReceiveSummary {
        frames_received,
        bytes_written,
        sequence_used: seq,
        tx_id: rx_tx_id,
    }))
}

/// Locate the direction indicator inside a data frame.
///
/// Some peers prefix frames with the record's own 4-byte RDW, others with
/// a stray 0xFF pad byte. Returns the offset of the direction indicator;
/// everything after it is payload. A direction byte other than `T` is
/// reported but does not abort the transfer.
fn payload_offset(frame: &Frame) -> usize {
    let data = &frame.data;
    let mut offset = 0;

    // A plausible embedded RDW: positive and smaller than the remainder
    if data.len() >= 5 {
        let candidate = frame.as_u32(0, 4) as usize;
        if candidate > 0 && candidate < data.len() - 4 {
            trace!("Embedded RDW of {} bytes, skipping prefix", candidate);
            offset = 4;
        }
    }

    // Stray pad byte directly ahead of the indicator
    if data.get(offset) == Some(&PAD_FF) && data.get(offset + 1) == Some(&DIRECTION_FROM_MIP) {
        trace!("Stray 0xFF pad ahead of direction indicator");
        offset += 1;
    }

    match data.get(offset) {
        Some(&DIRECTION_FROM_MIP) => {}
        Some(&other) => {
            warn!(
                "Direction indicator expected 'T' (0xE3), got 0x{:02X}; context: {}",
                other,
                hex_bytes(&data[..data.len().min(20)])
            );
        }
        None => warn!("Empty data frame"),
    }

    offset
}
