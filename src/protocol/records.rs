//! Protocol record builders, frame accessors and acknowledgement checks.
//!
//! Every alphanumeric field is EBCDIC Cp500; counts are big-endian
//! unsigned. Layouts follow the bulk file transfer record types.

use crate::codec::{ebcdic, hex_bytes};
use crate::error::{MipError, Result};

use super::constants::*;
use super::txid::TransmissionId;

/// A protocol record received from the MIP, without its length prefix.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw payload bytes
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The 3-character record code, decoded from EBCDIC.
    pub fn code(&self) -> String {
        self.as_ebcdic(0, 3)
    }

    /// Decode a field as EBCDIC text; empty when the range is out of bounds.
    pub fn as_ebcdic(&self, start: usize, len: usize) -> String {
        match self.data.get(start..start + len) {
            Some(slice) => ebcdic::decode_string(slice),
            None => String::new(),
        }
    }

    /// Decode up to 4 bytes as a big-endian unsigned value; 0 when out of
    /// bounds.
    pub fn as_u32(&self, start: usize, len: usize) -> u32 {
        match self.data.get(start..start + len) {
            Some(slice) => slice.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32),
            None => 0,
        }
    }

    /// Whole frame as hex, for diagnostics.
    pub fn hex(&self) -> String {
        hex_bytes(&self.data)
    }
}

/// Build a 004 header announcing a transmission TO Mastercard.
///
/// 60 bytes: code, record type, 14-char Transmission ID, then 17 filler,
/// 4 + 4 reserved and 16 filler bytes, all zero. The reserved fields are
/// emitted as zeros; peers may populate them but nothing here depends on
/// it.
pub fn header_004(tx_id: &TransmissionId) -> Vec<u8> {
    let mut b = Vec::with_capacity(HEADER_LEN);
    b.extend_from_slice(&ebcdic::encode_string(CODE_HEADER));
    b.extend_from_slice(&ebcdic::encode_string(RECORD_TYPE));
    b.extend_from_slice(&ebcdic::encode_string(tx_id.as_str()));
    b.resize(HEADER_LEN, 0x00);
    b
}

/// Build a 101 request for a transmission FROM Mastercard.
///
/// 19 bytes: code, record type, 14-char Transmission ID.
pub fn request_101(tx_id: &TransmissionId) -> Vec<u8> {
    let mut b = Vec::with_capacity(REQUEST_LEN);
    b.extend_from_slice(&ebcdic::encode_string(CODE_REQUEST));
    b.extend_from_slice(&ebcdic::encode_string(RECORD_TYPE));
    b.extend_from_slice(&ebcdic::encode_string(tx_id.as_str()));
    b
}

/// Build a 998 trailer closing a send.
///
/// 11 bytes: code, record type, return code "00" and a 4-byte big-endian
/// count. The count includes the trailer itself, so it is data frames + 1.
pub fn trailer_998(data_frames: u32) -> Vec<u8> {
    let count = data_frames + 1;
    let mut b = Vec::with_capacity(TRAILER_LEN);
    b.extend_from_slice(&ebcdic::encode_string(CODE_TRAILER));
    b.extend_from_slice(&ebcdic::encode_string(RECORD_TYPE));
    b.extend_from_slice(&ebcdic::encode_string(RETURN_CODE_OK));
    b.extend_from_slice(&count.to_be_bytes());
    b
}

/// Build a 999 purge authorising deletion of a received transmission.
///
/// 21 bytes: code, record type, return code "00" and the 14-char
/// Transmission ID reported by the MIP.
pub fn purge_999(tx_id: &str) -> Vec<u8> {
    let mut b = Vec::with_capacity(PURGE_LEN);
    b.extend_from_slice(&ebcdic::encode_string(CODE_PURGE));
    b.extend_from_slice(&ebcdic::encode_string(RECORD_TYPE));
    b.extend_from_slice(&ebcdic::encode_string(RETURN_CODE_OK));
    b.extend_from_slice(&ebcdic::encode_string(tx_id));
    b
}

/// Validate an acknowledgement frame at the end of a protocol stage.
///
/// Accepts any 998 with return code "00". The record type in bytes 3..5 is
/// commonly "01" but other values ("6A" has been observed) are tolerated.
/// A non-998 frame is logged and accepted - some nodes interleave
/// informational records at ACK points. A 998 with a non-zero return code
/// fails the stage.
pub fn check_ack(stage: &str, frame: &Frame) -> Result<()> {
    let code = frame.code();
    if code != CODE_TRAILER {
        info!("{} - response is not 998, raw={}", stage, frame.hex());
        return Ok(());
    }

    let record_type = frame.as_ebcdic(3, 2);
    let rc = frame.as_ebcdic(5, 2);
    if rc != RETURN_CODE_OK {
        error!("{} rejected -> 998/{} rc={}, raw={}", stage, record_type, rc, frame.hex());
        return Err(MipError::Protocol(format!(
            "{} rejected by MIP (rc={})",
            stage, rc
        )));
    }

    debug!("{} OK -> 998/{} rc=00", stage, record_type);
    Ok(())
}
