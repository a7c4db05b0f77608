//! Decoding of frames produced by the builder

use crate::ethernet::{EtherType, EthernetHeader};
use crate::ip::{IpProtocol, Ipv4Header};
use crate::udp::UdpHeader;

/// Borrowed view of an Ethernet/IPv4/UDP frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedFrame<'a> {
    pub ethernet: EthernetHeader,
    pub ip: Ipv4Header,
    pub udp: UdpHeader,
    pub payload: &'a [u8],
}

impl<'a> ParsedFrame<'a> {
    /// Decode `data` as an option-less Ethernet/IPv4/UDP frame.
    ///
    /// Returns `None` for other EtherTypes or protocols, and for frames
    /// shorter than their headers. The payload runs to the end of `data`.
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let ethernet = EthernetHeader::from_bytes(data)?;
        if ethernet.ethertype != EtherType::IPv4 {
            return None;
        }

        let rest = &data[EthernetHeader::HEADER_SIZE..];
        let ip = Ipv4Header::from_bytes(rest)?;
        if ip.protocol != IpProtocol::UDP {
            return None;
        }

        let rest = &rest[Ipv4Header::HEADER_SIZE..];
        let udp = UdpHeader::from_bytes(rest)?;

        Some(ParsedFrame {
            ethernet,
            ip,
            udp,
            payload: &rest[UdpHeader::HEADER_SIZE..],
        })
    }

    /// Whether the IPv4 header checksum verifies
    pub fn ip_checksum_valid(&self) -> bool {
        self.ip.checksum_is_valid()
    }

    /// Whether the UDP checksum verifies against an RFC 768 pseudo-header
    pub fn udp_checksum_valid(&self) -> bool {
        self.udp
            .validate_checksum(self.ip.source, self.ip.destination, self.payload)
    }

    /// Whether the length fields agree with the bytes actually present
    pub fn lengths_consistent(&self) -> bool {
        let data_len = UdpHeader::HEADER_SIZE + self.payload.len();
        self.udp.length as usize == data_len
            && self.ip.total_length as usize == Ipv4Header::HEADER_SIZE + data_len
    }
}
