//! Frame construction library for udpcap
//!
//! This crate builds the Ethernet II / IPv4 / UDP frames that udpcap wraps
//! around raw payload bytes. It includes:
//!
//! - **Address decoding** of textual MAC, IPv4 and port values
//! - **Ethernet II** headers
//! - **IPv4** headers with header checksum calculation
//! - **UDP** headers with pseudo-header checksum
//! - **Frame builder** that owns addressing and the IP identification counter
//!
//! # Architecture
//!
//! - [`address`] - Total decoders for textual addresses
//! - [`checksum`] - Internet checksum and UDP pseudo-header checksum
//! - [`ethernet`] - Ethernet II header construction and parsing
//! - [`ip`] - IPv4 header construction and parsing
//! - [`udp`] - UDP header construction and parsing
//! - [`builder`] - Complete frame assembly
//! - [`frame`] - Decoding and verification of assembled frames
//!
//! # Quick Start
//!
//! ```rust
//! use udpcap_packet::address::{parse_ipv4, parse_mac};
//! use udpcap_packet::{Endpoint, FrameBuilder, NetworkConfig};
//!
//! let config = NetworkConfig {
//!     source: Endpoint::new(parse_mac("00:11:22:33:44:55"), parse_ipv4("192.168.1.100"), 54321),
//!     destination: Endpoint::new(parse_mac("aa:bb:cc:dd:ee:ff"), parse_ipv4("192.168.1.1"), 53),
//! };
//!
//! let mut builder = FrameBuilder::new(config);
//! let frame = builder.assemble(&[0x12, 0x34, 0x01, 0x00]).unwrap();
//! assert_eq!(frame.len(), 42 + 4);
//! ```

pub mod address;
pub mod builder;
pub mod checksum;
pub mod ethernet;
pub mod frame;
pub mod ip;
pub mod udp;

// Re-export commonly used types for convenience
pub use builder::{
    encode_frame, Endpoint, FrameBuilder, NetworkConfig, PacketIdCounter, DEFAULT_MAX_PAYLOAD,
    DEFAULT_PACKET_ID_SEED, FRAME_OVERHEAD, MAX_UDP_PAYLOAD,
};
pub use checksum::{ip_checksum, udp_checksum, ChecksumMode, PseudoHeader};
pub use ethernet::{EtherType, EthernetHeader, MacAddress};
pub use frame::ParsedFrame;
pub use ip::{IpProtocol, Ipv4Header};
pub use udp::UdpHeader;
