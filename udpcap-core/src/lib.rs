//! udpcap core library
//!
//! This crate provides the error handling and blocking I/O helpers shared by
//! the udpcap crates: the frame builder, the pcap writer and the
//! command-line driver.

pub mod error;
pub mod io;

// Re-export commonly used types
pub use error::{Error, Result};
pub use io::read_full;
