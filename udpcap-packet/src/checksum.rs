//! Checksum calculations for IPv4 and UDP headers
//!
//! This module provides the one's-complement Internet Checksum (RFC 1071)
//! used in the IPv4 header and the UDP checksum that additionally covers a
//! pseudo-header built from the enclosing IP header.

use std::net::Ipv4Addr;

/// Sums `data` as big-endian 16-bit words in one's-complement arithmetic.
///
/// Carries are folded back in as they occur, so the result never exceeds
/// `0xFFFF` whatever the length of `data`. An odd trailing byte is treated as
/// the high byte of a word whose low byte is zero. The pad byte only exists
/// for the arithmetic and is never sent.
fn sum_words(data: &[u8]) -> u32 {
    let mut sum: u32 = 0;

    // Process 16-bit words
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        let word = u16::from_be_bytes([chunk[0], chunk[1]]);
        sum = add_folded(sum, word as u32);
    }

    // Handle odd byte if present
    if let Some(&byte) = chunks.remainder().first() {
        sum = add_folded(sum, (byte as u32) << 8);
    }

    sum
}

/// Adds two values of at most `0xFFFF` with end-around carry
fn add_folded(sum: u32, word: u32) -> u32 {
    let sum = sum + word;
    (sum & 0xFFFF) + (sum >> 16)
}

/// Folds carries above bit 15 back into the low 16 bits until none remain.
pub fn fold(mut sum: u32) -> u16 {
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// Calculates the Internet Checksum as defined in RFC 1071.
///
/// The data is treated as a sequence of 16-bit big-endian words which are
/// summed, folded to 16 bits and complemented.
///
/// # Examples
///
/// ```
/// use udpcap_packet::checksum::internet_checksum;
///
/// let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
/// assert_eq!(internet_checksum(&data), 0x220d);
/// ```
pub fn internet_checksum(data: &[u8]) -> u16 {
    !fold(sum_words(data))
}

/// Calculates the IPv4 header checksum.
///
/// `header` is the complete IP header region. Its checksum field (bytes 10
/// and 11) must be zero while the checksum is computed.
///
/// # Examples
///
/// ```
/// use udpcap_packet::checksum::ip_checksum;
///
/// let header = [
///     0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11,
///     0x00, 0x00, 0xc0, 0xa8, 0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
/// ];
/// assert_eq!(ip_checksum(&header), 0xb861);
/// ```
pub fn ip_checksum(header: &[u8]) -> u16 {
    internet_checksum(header)
}

/// Where the pseudo-header length of the UDP checksum comes from, and how a
/// computed checksum of zero is transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumMode {
    /// Pseudo-header length derived as `ip_total_length - 20`; a computed
    /// checksum of zero goes out as zero.
    Legacy,
    /// Pseudo-header length taken from the UDP length field; a computed
    /// checksum of zero goes out as `0xFFFF` (RFC 768).
    #[default]
    Rfc768,
}

impl ChecksumMode {
    /// Length value placed in the pseudo-header.
    pub fn pseudo_length(self, ip_total_length: u16, udp_length: u16) -> u16 {
        match self {
            ChecksumMode::Legacy => ip_total_length.wrapping_sub(20),
            ChecksumMode::Rfc768 => udp_length,
        }
    }

    /// Value written to the UDP checksum field for a computed checksum.
    pub fn transmitted(self, checksum: u16) -> u16 {
        match self {
            // Zero means "no checksum" on the wire
            ChecksumMode::Rfc768 if checksum == 0 => 0xFFFF,
            _ => checksum,
        }
    }
}

/// UDP pseudo-header. It only takes part in the checksum computation and is
/// never transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PseudoHeader {
    /// Source IP address
    pub source: Ipv4Addr,
    /// Destination IP address
    pub destination: Ipv4Addr,
    /// IP protocol number (17 for UDP)
    pub protocol: u8,
    /// Length of the UDP header and data
    pub length: u16,
}

impl PseudoHeader {
    /// Create a pseudo-header with an explicit length
    pub fn new(source: Ipv4Addr, destination: Ipv4Addr, protocol: u8, length: u16) -> Self {
        PseudoHeader {
            source,
            destination,
            protocol,
            length,
        }
    }

    /// Create a pseudo-header whose length is derived from the enclosing IP
    /// total length as `ip_total_length - 20`
    pub fn from_ip_total_length(
        source: Ipv4Addr,
        destination: Ipv4Addr,
        protocol: u8,
        ip_total_length: u16,
    ) -> Self {
        Self::new(
            source,
            destination,
            protocol,
            ip_total_length.wrapping_sub(20),
        )
    }

    fn sum(&self) -> u32 {
        sum_words(&self.source.octets())
            + sum_words(&self.destination.octets())
            // zero byte followed by the protocol byte
            + self.protocol as u32
            + self.length as u32
    }
}

/// Calculates the UDP checksum over the pseudo-header, the UDP header (with a
/// zero checksum field) and the payload.
///
/// The result is the raw one's-complement value. Use
/// [`ChecksumMode::transmitted`] for the value that goes on the wire.
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use udpcap_packet::checksum::{udp_checksum, PseudoHeader};
///
/// let pseudo = PseudoHeader::new(Ipv4Addr::new(1, 2, 3, 9), Ipv4Addr::new(1, 2, 3, 4), 17, 8);
/// assert_eq!(udp_checksum(&pseudo, 10012, 10012, 8, &[]), 0xa995);
/// ```
pub fn udp_checksum(
    pseudo: &PseudoHeader,
    src_port: u16,
    dst_port: u16,
    udp_length: u16,
    payload: &[u8],
) -> u16 {
    let sum = pseudo.sum()
        + src_port as u32
        + dst_port as u32
        + udp_length as u32
        + sum_words(payload);

    !fold(sum)
}

/// Validates an Internet checksum.
///
/// To validate a checksum, calculate the checksum over the entire region
/// including the checksum field. The result should be 0 (or 0xFFFF which is
/// equivalent in one's complement).
pub fn validate_checksum(data: &[u8]) -> bool {
    let result = internet_checksum(data);
    result == 0 || result == 0xFFFF
}

/// Returns the folded sum of `data` before the one's complement is taken.
///
/// A header summed together with its own correct checksum yields `0xFFFF`.
pub fn checksum_accumulate(data: &[u8]) -> u16 {
    fold(sum_words(data))
}
