//! Transmission ID handling.
//!
//! A Transmission ID names one bulk file transmission on the MIP. The full
//! form is 14 characters, `D ttt EEEEE JJJ SS`: direction (`R` send / `T`
//! receive), 3-digit transmission type, 5-digit endpoint, 3-digit Julian
//! day and 2-digit sequence. The 9-character short form omits day and
//! sequence and is completed with the current Julian day and sequence 01.

use chrono::{Datelike, Local};
use std::fmt;

use crate::error::{MipError, Result};

use super::constants::{TXID_LEN, TXID_SHORT_LEN};

/// Transfer direction, named after the wire direction indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// TO Mastercard; IDs and data records carry `R`
    Send,
    /// FROM Mastercard; IDs and data records carry `T`
    Receive,
}

impl Direction {
    /// Transmission ID prefix character for this direction.
    pub fn prefix(&self) -> char {
        match self {
            Direction::Send => 'R',
            Direction::Receive => 'T',
        }
    }
}

/// A normalized, always 14-character Transmission ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionId(String);

impl TransmissionId {
    /// Normalize a raw ID for the given direction.
    ///
    /// 14-character input passes through verbatim; 9-character input is
    /// completed with the current Julian day and sequence "01"; anything
    /// else is rejected, as is a wrong direction prefix.
    pub fn normalize(raw: &str, direction: Direction) -> Result<Self> {
        let s = raw.trim();
        let prefix = direction.prefix();

        if !s.starts_with(prefix) {
            return Err(MipError::Usage(format!(
                "Transmission ID must start with '{}' for this operation, got '{}'",
                prefix, s
            )));
        }

        match s.len() {
            TXID_LEN => Ok(Self(s.to_string())),
            TXID_SHORT_LEN => {
                let julian = Local::now().ordinal();
                Ok(Self(format!("{}{:03}01", s, julian)))
            }
            _ => Err(MipError::Usage(format!(
                "Transmission ID must be 9 or 14 characters \
                 ({p}tttEEEEE or {p}tttEEEEEJJJSS), got '{s}'",
                p = prefix
            ))),
        }
    }

    /// The 14-character ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Direction, type, endpoint and Julian day; everything but the sequence.
    pub fn prefix12(&self) -> &str {
        &self.0[..12]
    }

    /// The 2-digit sequence number.
    pub fn sequence(&self) -> Result<u32> {
        self.0[12..14]
            .parse()
            .map_err(|_| MipError::Usage(format!("Non-numeric sequence in '{}'", self.0)))
    }

    /// The same transmission with another sequence number.
    pub fn with_sequence(&self, sequence: u32) -> Self {
        Self(format!("{}{:02}", self.prefix12(), sequence))
    }
}

impl fmt::Display for TransmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
