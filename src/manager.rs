//! Composed transfer manager.
//!
//! Ties the converter and the transfer protocol together for the four
//! end-to-end operations. Text-mode transfers go through a private
//! temporary IPM file that is removed on success and on every failure
//! path.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use uuid::Uuid;

use crate::codec::convert;
use crate::config::Config;
use crate::error::Result;
use crate::protocol::{self, Direction, TransmissionId};

/// Transfer direction as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Transmit a file TO Mastercard
    Send,
    /// Fetch a file FROM Mastercard
    Receive,
}

/// On-disk representation of the local file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileEncoding {
    /// Binary IPM container, transferred as-is
    Ebcdic,
    /// Line-oriented text, converted to/from IPM around the transfer
    Ascii,
}

/// Run one end-to-end transfer.
pub async fn transfer(
    mode: Mode,
    host: &str,
    port: u16,
    file: &Path,
    encoding: FileEncoding,
    ipm_name: &str,
    config: &Config,
) -> Result<()> {
    match (mode, encoding) {
        (Mode::Send, FileEncoding::Ebcdic) => {
            let tx_id = TransmissionId::normalize(ipm_name, Direction::Send)?;
            protocol::send_file(host, port, file, &tx_id, config).await?;
        }
        (Mode::Send, FileEncoding::Ascii) => {
            let tx_id = TransmissionId::normalize(ipm_name, Direction::Send)?;
            let temp = temp_ipm_path("ipm_encoded_");
            info!("Encoding {} into temporary {}", file.display(), temp.display());

            let result: Result<()> = async {
                convert::encode_file(file, &temp)?;
                protocol::send_file(host, port, &temp, &tx_id, config).await?;
                Ok(())
            }
            .await;

            cleanup_temp(&temp);
            result?;
        }
        (Mode::Receive, FileEncoding::Ebcdic) => {
            let tx_id = TransmissionId::normalize(ipm_name, Direction::Receive)?;
            protocol::receive_file(host, port, file, &tx_id, config).await?;
        }
        (Mode::Receive, FileEncoding::Ascii) => {
            let tx_id = TransmissionId::normalize(ipm_name, Direction::Receive)?;
            let temp = temp_ipm_path("ipm_received_");
            info!("Receiving into temporary {}", temp.display());

            let result: Result<()> = async {
                protocol::receive_file(host, port, &temp, &tx_id, config).await?;
                convert::decode_file(&temp, file)?;
                Ok(())
            }
            .await;

            cleanup_temp(&temp);
            result?;
        }
    }
    Ok(())
}

/// A unique path in the system temp directory, never reused across runs.
fn temp_ipm_path(prefix: &str) -> PathBuf {
    let millis = chrono::Utc::now().timestamp_millis();
    let uuid = Uuid::new_v4().simple().to_string();
    std::env::temp_dir().join(format!("{}{}_{}.ipm", prefix, millis, &uuid[..8]))
}

fn cleanup_temp(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed temporary file {}", path.display()),
        Err(e) => warn!("Could not remove temporary file {}: {}", path.display(), e),
    }
}
