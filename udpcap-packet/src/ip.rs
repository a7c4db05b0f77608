//! IPv4 header construction and parsing
//!
//! Only option-less 20-byte headers are produced. Fragmentation is never
//! used: every header carries the Don't Fragment flag and a zero offset.

use crate::checksum::{ip_checksum, validate_checksum};
use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;

/// IP Protocol numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    /// UDP (17)
    UDP,
    /// Any other protocol number
    Custom(u8),
}

impl IpProtocol {
    pub fn to_u8(self) -> u8 {
        match self {
            IpProtocol::UDP => 17,
            IpProtocol::Custom(val) => val,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            17 => IpProtocol::UDP,
            val => IpProtocol::Custom(val),
        }
    }
}

/// IP Flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpFlags {
    /// Reserved bit (must be 0)
    pub reserved: bool,
    /// Don't Fragment flag
    pub dont_fragment: bool,
    /// More Fragments flag
    pub more_fragments: bool,
}

impl IpFlags {
    /// No flags set
    pub const NONE: IpFlags = IpFlags {
        reserved: false,
        dont_fragment: false,
        more_fragments: false,
    };

    /// Don't Fragment flag set
    pub const DONT_FRAGMENT: IpFlags = IpFlags {
        reserved: false,
        dont_fragment: true,
        more_fragments: false,
    };

    /// Convert to 3-bit value
    pub fn to_u8(self) -> u8 {
        let mut flags = 0u8;
        if self.reserved {
            flags |= 0b100;
        }
        if self.dont_fragment {
            flags |= 0b010;
        }
        if self.more_fragments {
            flags |= 0b001;
        }
        flags
    }

    /// Parse from 3-bit value
    pub fn from_u8(value: u8) -> Self {
        IpFlags {
            reserved: (value & 0b100) != 0,
            dont_fragment: (value & 0b010) != 0,
            more_fragments: (value & 0b001) != 0,
        }
    }
}

impl Default for IpFlags {
    fn default() -> Self {
        IpFlags::NONE
    }
}

/// IPv4 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Version (always 4 for IPv4)
    pub version: u8,
    /// Internet Header Length in 32-bit words
    pub ihl: u8,
    /// Type of Service / DSCP
    pub tos: u8,
    /// Total length (header + data) in bytes
    pub total_length: u16,
    /// Identification
    pub identification: u16,
    /// Flags
    pub flags: IpFlags,
    /// Fragment offset (in 8-byte blocks)
    pub fragment_offset: u16,
    /// Time to Live
    pub ttl: u8,
    /// Protocol
    pub protocol: IpProtocol,
    /// Header checksum
    pub checksum: u16,
    /// Source IP address
    pub source: Ipv4Addr,
    /// Destination IP address
    pub destination: Ipv4Addr,
}

impl Ipv4Header {
    /// IPv4 header size without options
    pub const HEADER_SIZE: usize = 20;

    /// Maximum IPv4 packet size
    pub const MAX_PACKET_SIZE: usize = 65535;

    /// Create a header for a packet carrying `data_len` bytes after the
    /// header. The checksum is left at zero.
    ///
    /// `data_len` must not exceed `MAX_PACKET_SIZE - HEADER_SIZE`; callers
    /// check this before building.
    pub fn new(
        source: Ipv4Addr,
        destination: Ipv4Addr,
        protocol: IpProtocol,
        data_len: usize,
    ) -> Self {
        Ipv4Header {
            version: 4,
            ihl: 5,
            tos: 0,
            total_length: (Self::HEADER_SIZE + data_len) as u16,
            identification: 0,
            flags: IpFlags::DONT_FRAGMENT,
            fragment_offset: 0,
            ttl: 64,
            protocol,
            checksum: 0,
            source,
            destination,
        }
    }

    /// Set the Time to Live
    pub fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the identification field
    pub fn with_identification(mut self, id: u16) -> Self {
        self.identification = id;
        self
    }

    /// Set the flags
    pub fn with_flags(mut self, flags: IpFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Calculate and update the header checksum
    pub fn calculate_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = ip_checksum(&self.encode());
    }

    /// Whether the stored checksum matches the header contents
    pub fn checksum_is_valid(&self) -> bool {
        validate_checksum(&self.encode())
    }

    /// Encode the header into its 20 wire bytes
    pub fn encode(&self) -> [u8; Self::HEADER_SIZE] {
        let mut header = [0u8; Self::HEADER_SIZE];

        header[0] = (self.version << 4) | (self.ihl & 0x0F);
        header[1] = self.tos;
        header[2..4].copy_from_slice(&self.total_length.to_be_bytes());
        header[4..6].copy_from_slice(&self.identification.to_be_bytes());

        // Flags (3 bits) + Fragment Offset (13 bits)
        let flags_and_offset =
            ((self.flags.to_u8() as u16) << 13) | (self.fragment_offset & 0x1FFF);
        header[6..8].copy_from_slice(&flags_and_offset.to_be_bytes());

        header[8] = self.ttl;
        header[9] = self.protocol.to_u8();
        header[10..12].copy_from_slice(&self.checksum.to_be_bytes());
        header[12..16].copy_from_slice(&self.source.octets());
        header[16..20].copy_from_slice(&self.destination.octets());

        header
    }

    /// Append the header to `buffer`
    pub fn write_to(&self, buffer: &mut BytesMut) {
        buffer.put_slice(&self.encode());
    }

    /// Parse an IPv4 header from the start of `data`
    ///
    /// Headers carrying options are rejected; this tool never writes them.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::HEADER_SIZE {
            return None;
        }

        let version = data[0] >> 4;
        let ihl = data[0] & 0x0F;
        if version != 4 || ihl != 5 {
            return None;
        }

        let flags_and_offset = u16::from_be_bytes([data[6], data[7]]);

        Some(Ipv4Header {
            version,
            ihl,
            tos: data[1],
            total_length: u16::from_be_bytes([data[2], data[3]]),
            identification: u16::from_be_bytes([data[4], data[5]]),
            flags: IpFlags::from_u8((flags_and_offset >> 13) as u8),
            fragment_offset: flags_and_offset & 0x1FFF,
            ttl: data[8],
            protocol: IpProtocol::from_u8(data[9]),
            checksum: u16::from_be_bytes([data[10], data[11]]),
            source: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            destination: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum_accumulate;

    #[test]
    fn test_ip_protocol_conversion() {
        assert_eq!(IpProtocol::UDP.to_u8(), 17);
        assert_eq!(IpProtocol::from_u8(17), IpProtocol::UDP);
        assert_eq!(IpProtocol::from_u8(6), IpProtocol::Custom(6));
    }

    #[test]
    fn test_ip_flags() {
        let flags = IpFlags::DONT_FRAGMENT;
        assert_eq!(flags.to_u8(), 0b010);
        assert_eq!(IpFlags::from_u8(0b010), flags);
        assert_eq!(IpFlags::default(), IpFlags::NONE);
    }

    #[test]
    fn test_header_encode_layout() {
        let header = Ipv4Header::new(
            Ipv4Addr::new(1, 2, 3, 9),
            Ipv4Addr::new(1, 2, 3, 4),
            IpProtocol::UDP,
            8,
        )
        .with_ttl(14)
        .with_identification(8189);

        let bytes = header.encode();
        assert_eq!(bytes[0], 0x45);
        assert_eq!(bytes[1], 0x00);
        assert_eq!(&bytes[2..4], &[0x00, 28]);
        assert_eq!(&bytes[4..6], &8189u16.to_be_bytes());
        assert_eq!(&bytes[6..8], &[0x40, 0x00]);
        assert_eq!(bytes[8], 14);
        assert_eq!(bytes[9], 0x11);
        assert_eq!(&bytes[10..12], &[0x00, 0x00]);
        assert_eq!(&bytes[12..16], &[1, 2, 3, 9]);
        assert_eq!(&bytes[16..20], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_header_checksum() {
        let mut header = Ipv4Header::new(
            Ipv4Addr::new(1, 2, 3, 9),
            Ipv4Addr::new(1, 2, 3, 4),
            IpProtocol::UDP,
            8,
        )
        .with_ttl(14)
        .with_identification(8189);

        assert!(!header.checksum_is_valid());
        header.calculate_checksum();

        assert_eq!(header.checksum, 0x44c4);
        assert!(header.checksum_is_valid());
        assert_eq!(checksum_accumulate(&header.encode()), 0xFFFF);
    }

    #[test]
    fn test_header_parse() {
        let mut header = Ipv4Header::new(
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(192, 168, 1, 2),
            IpProtocol::UDP,
            100,
        )
        .with_identification(0xBEEF);
        header.calculate_checksum();

        let parsed = Ipv4Header::from_bytes(&header.encode()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.total_length, 120);
    }

    #[test]
    fn test_header_parse_rejects_non_ipv4() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x60;
        assert!(Ipv4Header::from_bytes(&bytes).is_none());
        assert!(Ipv4Header::from_bytes(&bytes[..10]).is_none());
    }
}
