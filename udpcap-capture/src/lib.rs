//! pcap capture file output for udpcap
//!
//! This crate writes synthesized frames into classic libpcap capture files
//! and reads them back.
//!
//! ## Features
//!
//! - **Writer**: Global header emitted once, one record per frame
//! - **Timestamps**: Run-start or per-record wall-clock policy
//! - **Reader**: Iterates the records of a capture for inspection
//! - **Statistics**: Record and byte counts for a run
//!
//! ## Example
//!
//! ```
//! use udpcap_capture::{PcapReader, PcapWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = PcapWriter::new(Vec::new())?;
//! writer.write_frame(&[0u8; 60])?;
//!
//! let bytes = writer.into_inner();
//! let reader = PcapReader::new(bytes.as_slice())?;
//! assert_eq!(reader.count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod pcap;
pub mod stats;

// Re-export main types
pub use clock::{RecordClock, RecordTimestamp, TimestampMode};
pub use pcap::{
    write_global_header, LinkType, PcapGlobalHeader, PcapReader, PcapRecord, PcapRecordHeader,
    PcapWriter, DEFAULT_SNAPLEN, MAX_ETHERNET_FRAME, PCAP_MAGIC,
};
pub use stats::{StatsAccumulator, WriterStats};
