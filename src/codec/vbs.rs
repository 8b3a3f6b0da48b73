//! VBS/RDW record stream codec.
//!
//! The middle IPM container layer is a Variable Blocked Spanned stream:
//! each record is preceded by a 4-byte big-endian Record Descriptor Word
//! holding the payload length (the RDW itself is not counted), and the
//! stream is terminated by a zero-length RDW.

use crate::error::{MipError, Result};

/// Serialize records into a VBS stream.
///
/// Emits `len32BE || payload` per record and a four-zero-byte terminator.
pub fn encode(records: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = records.iter().map(|r| r.len() + 4).sum();
    let mut out = Vec::with_capacity(total + 4);

    for record in records {
        out.extend_from_slice(&(record.len() as u32).to_be_bytes());
        out.extend_from_slice(record);
    }
    out.extend_from_slice(&[0, 0, 0, 0]);

    out
}

/// Parse a VBS stream into its records.
///
/// Stops at the first zero-length RDW. A stream that ends between records
/// with fewer than 4 bytes left (no terminator seen) is tolerated and
/// yields the records collected so far. A negative RDW or one that runs
/// past the end of the buffer is a framing error reported with the byte
/// offset of the length field.
pub fn decode(vbs: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut records = Vec::new();
    let mut pos = 0;

    while pos + 4 <= vbs.len() {
        let len = i32::from_be_bytes([vbs[pos], vbs[pos + 1], vbs[pos + 2], vbs[pos + 3]]);

        if len == 0 {
            debug!("VBS terminator at offset {}", pos);
            break;
        }
        if len < 0 || pos + 4 + len as usize > vbs.len() {
            return Err(MipError::Framing {
                offset: pos,
                length: len,
            });
        }

        let start = pos + 4;
        let end = start + len as usize;
        records.push(vbs[start..end].to_vec());
        pos = end;
    }

    Ok(records)
}
