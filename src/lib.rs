//! mip-transfer - Bulk IPM file transfer to/from a Mastercard MIP
//!
//! This library provides:
//! - The IPM container codec: EBCDIC Cp500, VBS/RDW record streams and
//!   1014-byte physical blocking, with line-oriented text conversion
//! - The MIP bulk file transfer protocol: length-framed TCP dialogues for
//!   send (004 / data / 998) and receive (101 / 004 / data / 998 / 999)
//!   including the automatic sequence scan
//! - A composed manager running whole transfers with on-the-fly
//!   ASCII <-> EBCDIC conversion through temporary IPM files

#[macro_use]
mod logging;

pub mod codec;
pub mod config;
pub mod error;
pub mod manager;
pub mod protocol;

pub use config::Config;
pub use error::{MipError, Result};
pub use protocol::{Direction, TransmissionId};
