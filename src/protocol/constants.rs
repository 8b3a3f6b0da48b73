//! Bulk file transfer protocol constants.
//!
//! Record codes travel as EBCDIC Cp500 text; direction indicators and
//! counts are raw bytes. Reference: Mastercard File Transfer Manual,
//! record types used in bulk file transfer.

/// Header record announcing a transmission TO Mastercard.
pub const CODE_HEADER: &str = "004";

/// Request record asking for a transmission FROM Mastercard.
pub const CODE_REQUEST: &str = "101";

/// Trailer / acknowledgement record.
pub const CODE_TRAILER: &str = "998";

/// Purge record authorising deletion after a completed receive.
pub const CODE_PURGE: &str = "999";

/// Nominal record type carried in bytes 3..5 of each protocol record.
pub const RECORD_TYPE: &str = "01";

/// Return code signalling success.
pub const RETURN_CODE_OK: &str = "00";

/// Direction indicator on data records sent TO Mastercard ('R' in Cp500).
pub const DIRECTION_TO_MIP: u8 = 0xD9;

/// Direction indicator on data records FROM Mastercard ('T' in Cp500).
pub const DIRECTION_FROM_MIP: u8 = 0xE3;

/// Stray padding byte some peers insert ahead of the direction indicator.
pub const PAD_FF: u8 = 0xFF;

/// Maximum file bytes carried per data record.
pub const DATA_CHUNK: usize = 1014;

/// Total size of a 004 header record.
pub const HEADER_LEN: usize = 60;

/// Total size of a 101 request record.
pub const REQUEST_LEN: usize = 19;

/// Total size of a 998 trailer record.
pub const TRAILER_LEN: usize = 11;

/// Total size of a 999 purge record.
pub const PURGE_LEN: usize = 21;

/// Length of a Transmission ID in characters.
pub const TXID_LEN: usize = 14;

/// Length of the short Transmission ID form (direction + type + endpoint).
pub const TXID_SHORT_LEN: usize = 9;

/// Highest sequence number probed during the receive scan.
pub const MAX_SEQUENCE: u32 = 99;

/// Largest payload a length-prefixed frame can carry.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;
