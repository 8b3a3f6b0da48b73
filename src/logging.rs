//! Logging macros that set target to "mip_transfer" for all log calls.
//!
//! Without an explicit target, tracing uses the full module path
//! (e.g., "mip_transfer::protocol::receive"), creating overly verbose logger
//! names when this crate runs inside a larger batch scheduler. These macros
//! ensure all logs from this crate use a single "mip_transfer" target.

macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!(target: "mip_transfer", $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!(target: "mip_transfer", $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { ::tracing::info!(target: "mip_transfer", $($arg)*) };
}

macro_rules! warn {
    ($($arg:tt)*) => { ::tracing::warn!(target: "mip_transfer", $($arg)*) };
}

macro_rules! error {
    ($($arg:tt)*) => { ::tracing::error!(target: "mip_transfer", $($arg)*) };
}
