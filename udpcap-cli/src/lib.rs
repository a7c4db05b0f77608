//! Command-line driver for udpcap
//!
//! This crate holds the argument parsing, the layered configuration and the
//! run loop behind the `udpcap` binary. The run loop is stream-agnostic so it
//! can be driven from tests with in-memory buffers.

pub mod args;
pub mod config;
pub mod driver;

pub use args::{Cli, Commands};
pub use config::{resolve, FileConfig};
pub use driver::{inspect, run, InspectSummary, RunOptions, DEFAULT_CHUNK_SIZE};
