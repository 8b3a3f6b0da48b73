//! MIP bulk file transfer protocol.
//!
//! A conversational, length-framed state machine over one TCP connection:
//! typed request/reply records (004/101/998/999), direction-tagged data
//! records, acknowledgement validation, and an automatic sequence scan on
//! reception.

pub mod constants;
pub mod records;
pub mod receive;
pub mod send;
pub mod transport;
pub mod txid;

pub use receive::{receive_file, ReceiveSummary};
pub use records::Frame;
pub use send::{send_file, SendSummary};
pub use transport::FrameTransport;
pub use txid::{Direction, TransmissionId};
