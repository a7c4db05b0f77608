//! UDP header construction and parsing
//!
//! The UDP checksum covers a pseudo-header derived from the enclosing IPv4
//! header, so it is calculated from an [`Ipv4Header`] rather than from the
//! datagram alone.

use crate::checksum::{udp_checksum, ChecksumMode, PseudoHeader};
use crate::ip::Ipv4Header;
use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;

/// UDP protocol number
const UDP_PROTOCOL: u8 = 17;

/// UDP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    /// Source port
    pub source_port: u16,
    /// Destination port
    pub destination_port: u16,
    /// Length (header + data)
    pub length: u16,
    /// Checksum
    pub checksum: u16,
}

impl UdpHeader {
    /// UDP header size in bytes
    pub const HEADER_SIZE: usize = 8;

    /// Create a header for a datagram carrying `payload_len` bytes
    ///
    /// Note: The checksum is set to 0 and must be calculated later using
    /// `calculate_checksum()` with the enclosing IP header.
    pub fn new(source_port: u16, destination_port: u16, payload_len: usize) -> Self {
        UdpHeader {
            source_port,
            destination_port,
            length: (Self::HEADER_SIZE + payload_len) as u16,
            checksum: 0,
        }
    }

    /// Calculate and set the UDP checksum
    ///
    /// # Arguments
    ///
    /// * `ip` - The enclosing IPv4 header, source of the pseudo-header
    /// * `payload` - The datagram payload
    /// * `mode` - How the pseudo-header length and a zero result are handled
    pub fn calculate_checksum(&mut self, ip: &Ipv4Header, payload: &[u8], mode: ChecksumMode) {
        let pseudo = PseudoHeader::new(
            ip.source,
            ip.destination,
            ip.protocol.to_u8(),
            mode.pseudo_length(ip.total_length, self.length),
        );

        let checksum = udp_checksum(
            &pseudo,
            self.source_port,
            self.destination_port,
            self.length,
            payload,
        );

        self.checksum = mode.transmitted(checksum);
    }

    /// Validate the UDP checksum against an RFC 768 pseudo-header
    ///
    /// # Returns
    ///
    /// `true` if the checksum is valid or if checksum is 0 (no checksum),
    /// `false` otherwise
    pub fn validate_checksum(&self, src_ip: Ipv4Addr, dst_ip: Ipv4Addr, payload: &[u8]) -> bool {
        // UDP checksum of 0 means no checksum
        if self.checksum == 0 {
            return true;
        }

        let pseudo = PseudoHeader::new(src_ip, dst_ip, UDP_PROTOCOL, self.length);
        let expected = udp_checksum(
            &pseudo,
            self.source_port,
            self.destination_port,
            self.length,
            payload,
        );

        ChecksumMode::Rfc768.transmitted(expected) == self.checksum
    }

    /// Append the header to `buffer`
    pub fn write_to(&self, buffer: &mut BytesMut) {
        buffer.put_u16(self.source_port);
        buffer.put_u16(self.destination_port);
        buffer.put_u16(self.length);
        buffer.put_u16(self.checksum);
    }

    /// Parse a UDP header from the start of `data`
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::HEADER_SIZE {
            return None;
        }

        Some(UdpHeader {
            source_port: u16::from_be_bytes([data[0], data[1]]),
            destination_port: u16::from_be_bytes([data[2], data[3]]),
            length: u16::from_be_bytes([data[4], data[5]]),
            checksum: u16::from_be_bytes([data[6], data[7]]),
        })
    }

    /// Get payload length
    pub fn payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(Self::HEADER_SIZE)
    }
}
