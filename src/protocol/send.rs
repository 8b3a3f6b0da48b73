//! Send dialogue: transmit an IPM file TO Mastercard.
//!
//! Successful transfer dialogue: 004 header, acknowledged; the file in
//! data records of at most 1014 bytes each prefixed with the `R` direction
//! indicator; a 998 trailer whose count includes the trailer itself,
//! acknowledged.

use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::config::Config;
use crate::error::Result;

use super::constants::{DATA_CHUNK, DIRECTION_TO_MIP};
use super::records::{self, check_ack};
use super::transport::FrameTransport;
use super::txid::TransmissionId;

/// Outcome of a completed send.
#[derive(Debug)]
pub struct SendSummary {
    /// Data frames written (excluding header and trailer)
    pub data_frames: u32,
    /// File bytes transmitted
    pub bytes_sent: u64,
}

/// Send the file at `path` to the MIP as transmission `tx_id`.
pub async fn send_file(
    host: &str,
    port: u16,
    path: &Path,
    tx_id: &TransmissionId,
    config: &Config,
) -> Result<SendSummary> {
    let mut file = File::open(path).await?;
    let file_len = file.metadata().await?.len();
    info!(
        "Sending {} ({} bytes) as {} to {}:{}",
        path.display(),
        file_len,
        tx_id,
        host,
        port
    );

    let mut transport = FrameTransport::connect(
        host,
        port,
        &config.transfer,
        config.logging.protocol_debug,
    )
    .await?;

    // Stage 1: header
    transport.write_framed(&records::header_004(tx_id)).await?;
    let ack = transport.read_framed().await?;
    check_ack("Header 004", &ack)?;

    // Stage 2: data records, one direction byte ahead of each chunk
    let mut data_frames = 0u32;
    let mut bytes_sent = 0u64;
    let mut frame = vec![0u8; DATA_CHUNK + 1];
    frame[0] = DIRECTION_TO_MIP;
    loop {
        // Fill the chunk completely so every frame but the last carries
        // exactly 1014 file bytes
        let mut n = 0;
        while n < DATA_CHUNK {
            let r = file.read(&mut frame[1 + n..]).await?;
            if r == 0 {
                break;
            }
            n += r;
        }
        if n == 0 {
            break;
        }
        transport.write_framed(&frame[..n + 1]).await?;
        data_frames += 1;
        bytes_sent += n as u64;
        if data_frames % 10 == 0 {
            debug!("Sent {} data frames", data_frames);
        }
    }
    info!("Sent {} data frames ({} bytes)", data_frames, bytes_sent);

    // Stage 3: trailer, counted inclusively
    transport.write_framed(&records::trailer_998(data_frames)).await?;
    let ack = transport.read_framed().await?;
    check_ack("Trailer 998", &ack)?;

    info!("Send of {} completed", tx_id);
    Ok(SendSummary {
        data_frames,
        bytes_sent,
    })
}
