//! mip-transfer - Bulk IPM file transfer to/from a Mastercard MIP
//!
//! This binary exposes:
//! - `encode` / `decode`: convert between line-oriented text and the
//!   binary IPM container format
//! - `send` / `receive`: run the MIP bulk file transfer protocol
//! - `transfer`: the composed manager with automatic conversion

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use mip_transfer::codec::convert;
use mip_transfer::config::{self, Config};
use mip_transfer::manager::{self, FileEncoding, Mode};
use mip_transfer::protocol::{self, Direction, TransmissionId};
use mip_transfer::{MipError, Result};

#[derive(Parser)]
#[command(name = "mip-transfer")]
#[command(version)]
#[command(about = "Bulk IPM file transfer to/from a Mastercard MIP")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose/debug logging including frame hex traces
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a line-oriented text file into a binary IPM container
    Encode {
        /// Text file to encode (one record per line)
        #[arg(long)]
        input: PathBuf,
        /// IPM output path
        #[arg(long)]
        output: PathBuf,
    },
    /// Decode a binary IPM container into line-oriented text
    Decode {
        /// IPM file to decode
        #[arg(long)]
        input: PathBuf,
        /// Text output path
        #[arg(long)]
        output: PathBuf,
    },
    /// Send an IPM file TO Mastercard
    Send {
        /// MIP host address
        #[arg(long)]
        ip: String,
        /// MIP port
        #[arg(long)]
        port: u16,
        /// IPM file to send
        #[arg(long)]
        file: PathBuf,
        /// Transmission ID (RtttEEEEE or RtttEEEEEJJJSS)
        #[arg(long)]
        ipmname: String,
    },
    /// Receive an IPM file FROM Mastercard
    Receive {
        /// MIP host address
        #[arg(long)]
        ip: String,
        /// MIP port
        #[arg(long)]
        port: u16,
        /// Destination path
        #[arg(long)]
        file: PathBuf,
        /// Transmission ID (TtttEEEEE or TtttEEEEEJJJSS)
        #[arg(long)]
        ipmname: String,
    },
    /// Run a whole transfer with automatic ASCII <-> EBCDIC conversion
    Transfer {
        /// Operation mode
        #[arg(long, value_enum, ignore_case = true)]
        mode: Mode,
        /// MIP host address
        #[arg(long)]
        ip: String,
        /// MIP port
        #[arg(long)]
        port: u16,
        /// Source (send) or destination (receive) path
        #[arg(long)]
        file: PathBuf,
        /// Local file format
        #[arg(long, value_enum, ignore_case = true)]
        encode: FileEncoding,
        /// Transmission ID (9 or 14 chars)
        #[arg(long)]
        ipmname: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Load configuration before logging so the configured level can apply
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    // Priority: --verbose flag, then RUST_LOG env var, then config level
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone())
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level.as_str())
        .init();

    if let Err(e) = run(cli.command, config).await {
        error!("{}", e);
        let code = match e {
            MipError::Usage(_) | MipError::Config(_) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let mut config = Config::default();
            config::apply_env_overrides(&mut config);
            config
        }
    };
    if cli.verbose {
        config.logging.protocol_debug = true;
    }
    Ok(config)
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Encode { input, output } => {
            let summary = convert::encode_file(&input, &output)?;
            info!(
                "Encode completed: {} records, {} blocks, {} bytes",
                summary.records, summary.blocks, summary.output_bytes
            );
        }
        Command::Decode { input, output } => {
            let summary = convert::decode_file(&input, &output)?;
            info!(
                "Decode completed: {} records (blocked: {})",
                summary.records, summary.blocked
            );
        }
        Command::Send {
            ip,
            port,
            file,
            ipmname,
        } => {
            let tx_id = TransmissionId::normalize(&ipmname, Direction::Send)?;
            let summary = protocol::send_file(&ip, port, &file, &tx_id, &config).await?;
            info!(
                "Send completed: {} data frames, {} bytes (total records: {})",
                summary.data_frames,
                summary.bytes_sent,
                summary.data_frames + 1
            );
        }
        Command::Receive {
            ip,
            port,
            file,
            ipmname,
        } => {
            let tx_id = TransmissionId::normalize(&ipmname, Direction::Receive)?;
            let summary = protocol::receive_file(&ip, port, &file, &tx_id, &config).await?;
            info!(
                "Receive completed: {} frames, {} bytes, sequence {:02}",
                summary.frames_received, summary.bytes_written, summary.sequence_used
            );
        }
        Command::Transfer {
            mode,
            ip,
            port,
            file,
            encode,
            ipmname,
        } => {
            manager::transfer(mode, &ip, port, &file, encode, &ipmname, &config).await?;
            info!("Transfer completed");
        }
    }
    Ok(())
}
