//! Frame builder for Ethernet/IPv4/UDP frames
//!
//! This module turns payload chunks into complete frames. Header fields are
//! filled in first; the IP header checksum and then the UDP checksum are
//! computed over the assembled headers before the payload is appended.

use crate::checksum::ChecksumMode;
use crate::ethernet::{EtherType, EthernetHeader, MacAddress};
use crate::ip::{IpFlags, IpProtocol, Ipv4Header};
use crate::udp::UdpHeader;
use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;
use tracing::{debug, warn};
use udpcap_core::{Error, Result};

/// Bytes of Ethernet, IPv4 and UDP header in front of every payload
pub const FRAME_OVERHEAD: usize =
    EthernetHeader::HEADER_SIZE + Ipv4Header::HEADER_SIZE + UdpHeader::HEADER_SIZE;

/// First IP identification value of a run
pub const DEFAULT_PACKET_ID_SEED: u16 = 8189;

/// Default payload limit, equal to the driver's default chunk size
pub const DEFAULT_MAX_PAYLOAD: usize = 1024;

/// Largest payload whose IP total length still fits in 16 bits
pub const MAX_UDP_PAYLOAD: usize =
    Ipv4Header::MAX_PACKET_SIZE - Ipv4Header::HEADER_SIZE - UdpHeader::HEADER_SIZE;

/// Time to live written into every frame
pub const FRAME_TTL: u8 = 14;

/// One side of the synthesized conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// MAC address
    pub mac: MacAddress,
    /// IPv4 address
    pub ip: Ipv4Addr,
    /// UDP port
    pub port: u16,
}

impl Endpoint {
    pub fn new(mac: MacAddress, ip: Ipv4Addr, port: u16) -> Self {
        Endpoint { mac, ip, port }
    }
}

/// Fixed addressing used for every frame of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Sender of the frames
    pub source: Endpoint,
    /// Receiver of the frames
    pub destination: Endpoint,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            source: Endpoint::new(
                MacAddress([0x00, 0x15, 0xc5, 0x09, 0xc7, 0xfd]),
                Ipv4Addr::new(1, 2, 3, 9),
                10012,
            ),
            destination: Endpoint::new(
                MacAddress([0x00, 0x0a, 0x35, 0x01, 0xbf, 0x4e]),
                Ipv4Addr::new(1, 2, 3, 4),
                10012,
            ),
        }
    }
}

/// IP identification counter, incremented once per frame and wrapping at
/// 65536
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketIdCounter(u16);

impl PacketIdCounter {
    pub fn new(seed: u16) -> Self {
        PacketIdCounter(seed)
    }

    /// The identification the next frame will carry
    pub fn peek(&self) -> u16 {
        self.0
    }

    /// Take the current identification and advance the counter
    pub fn next_id(&mut self) -> u16 {
        let id = self.0;
        self.0 = self.0.wrapping_add(1);
        id
    }
}

impl Default for PacketIdCounter {
    fn default() -> Self {
        PacketIdCounter::new(DEFAULT_PACKET_ID_SEED)
    }
}

/// Encode one Ethernet/IPv4/UDP frame around `payload`.
///
/// This is the stateless form of [`FrameBuilder::assemble`]: the caller
/// supplies the IP identification. The result is exactly
/// `FRAME_OVERHEAD + payload.len()` bytes long.
///
/// # Errors
///
/// Returns [`Error::BufferOverflow`] if the payload is larger than
/// [`MAX_UDP_PAYLOAD`].
pub fn encode_frame(
    payload: &[u8],
    source: &Endpoint,
    destination: &Endpoint,
    identification: u16,
    mode: ChecksumMode,
) -> Result<Vec<u8>> {
    if payload.len() > MAX_UDP_PAYLOAD {
        return Err(Error::BufferOverflow {
            size: payload.len(),
            max: MAX_UDP_PAYLOAD,
        });
    }

    let ethernet = EthernetHeader::new(destination.mac, source.mac, EtherType::IPv4);

    let mut ip = Ipv4Header::new(
        source.ip,
        destination.ip,
        IpProtocol::UDP,
        UdpHeader::HEADER_SIZE + payload.len(),
    )
    .with_identification(identification)
    .with_flags(IpFlags::DONT_FRAGMENT)
    .with_ttl(FRAME_TTL);

    let mut udp = UdpHeader::new(source.port, destination.port, payload.len());

    // Second pass: checksums over the finished header fields
    ip.calculate_checksum();
    udp.calculate_checksum(&ip, payload, mode);

    let mut buffer = BytesMut::with_capacity(FRAME_OVERHEAD + payload.len());
    ethernet.write_to(&mut buffer);
    ip.write_to(&mut buffer);
    udp.write_to(&mut buffer);
    buffer.put_slice(payload);

    debug_assert_eq!(buffer.len(), FRAME_OVERHEAD + payload.len());
    Ok(buffer.to_vec())
}

/// Builds frames for a run, owning the addressing and the IP identification
/// counter.
///
/// # Examples
///
/// ```
/// use udpcap_packet::{FrameBuilder, NetworkConfig};
///
/// let mut builder = FrameBuilder::new(NetworkConfig::default());
/// let frame = builder.assemble(b"hello").unwrap();
/// assert_eq!(frame.len(), 42 + 5);
/// assert_eq!(u16::from_be_bytes([frame[18], frame[19]]), 8189);
/// ```
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    config: NetworkConfig,
    packet_id: PacketIdCounter,
    max_payload: usize,
    checksum_mode: ChecksumMode,
}

impl FrameBuilder {
    /// Create a builder with the default packet ID seed, payload limit and
    /// checksum mode
    pub fn new(config: NetworkConfig) -> Self {
        FrameBuilder {
            config,
            packet_id: PacketIdCounter::default(),
            max_payload: DEFAULT_MAX_PAYLOAD,
            checksum_mode: ChecksumMode::default(),
        }
    }

    /// Set the payload limit
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `max` exceeds
    /// [`MAX_UDP_PAYLOAD`].
    pub fn with_max_payload(mut self, max: usize) -> Result<Self> {
        if max > MAX_UDP_PAYLOAD {
            return Err(Error::invalid_parameter(
                "max_payload",
                format!("{} exceeds the UDP limit of {}", max, MAX_UDP_PAYLOAD),
            ));
        }
        self.max_payload = max;
        Ok(self)
    }

    /// Set the first IP identification
    pub fn with_packet_id_seed(mut self, seed: u16) -> Self {
        self.packet_id = PacketIdCounter::new(seed);
        self
    }

    /// Set the UDP checksum mode
    pub fn with_checksum_mode(mut self, mode: ChecksumMode) -> Self {
        self.checksum_mode = mode;
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    pub fn checksum_mode(&self) -> ChecksumMode {
        self.checksum_mode
    }

    /// The IP identification the next frame will carry
    pub fn next_packet_id(&self) -> u16 {
        self.packet_id.peek()
    }

    /// Assemble a frame around `payload`, consuming one IP identification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferOverflow`] if the payload is larger than the
    /// configured maximum. The identification counter does not advance in
    /// that case.
    pub fn assemble(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > self.max_payload {
            warn!(
                size = payload.len(),
                max = self.max_payload,
                "rejecting oversized payload"
            );
            return Err(Error::BufferOverflow {
                size: payload.len(),
                max: self.max_payload,
            });
        }

        let id = self.packet_id.peek();
        let frame = encode_frame(
            payload,
            &self.config.source,
            &self.config.destination,
            id,
            self.checksum_mode,
        )?;
        self.packet_id.next_id();

        debug!(id, payload = payload.len(), frame = frame.len(), "assembled frame");
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum_accumulate;
    use proptest::prelude::*;

    fn frame_id(frame: &[u8]) -> u16 {
        u16::from_be_bytes([frame[18], frame[19]])
    }

    #[test]
    fn test_frame_overhead() {
        assert_eq!(FRAME_OVERHEAD, 42);
        assert_eq!(MAX_UDP_PAYLOAD, 65507);
    }

    #[test]
    fn test_empty_payload_frame_bytes() {
        let mut builder = FrameBuilder::new(NetworkConfig::default());
        let frame = builder.assemble(&[]).unwrap();

        let expected: [u8; 42] = [
            // Ethernet: dst, src, type
            0x00, 0x0a, 0x35, 0x01, 0xbf, 0x4e, 0x00, 0x15, 0xc5, 0x09, 0xc7, 0xfd, 0x08, 0x00,
            // IPv4
            0x45, 0x00, 0x00, 0x1c, 0x1f, 0xfd, 0x40, 0x00, 0x0e, 0x11, 0x44, 0xc4, 0x01, 0x02,
            0x03, 0x09, 0x01, 0x02, 0x03, 0x04,
            // UDP
            0x27, 0x1c, 0x27, 0x1c, 0x00, 0x08, 0xa9, 0x95,
        ];
        assert_eq!(frame, expected);
    }

    #[test]
    fn test_odd_payload_frame() {
        let mut builder = FrameBuilder::new(NetworkConfig::default());
        let frame = builder.assemble(b"hello").unwrap();

        assert_eq!(frame.len(), 47);
        assert_eq!(&frame[16..18], &[0x00, 33]);
        assert_eq!(&frame[24..26], &[0x44, 0xbf]);
        assert_eq!(&frame[38..40], &[0x00, 13]);
        assert_eq!(&frame[40..42], &[0x65, 0xb9]);
        assert_eq!(&frame[42..], b"hello");
    }

    #[test]
    fn test_ip_header_self_check() {
        let mut builder = FrameBuilder::new(NetworkConfig::default());
        let frame = builder.assemble(&[0xAB; 100]).unwrap();

        let ip_header = &frame[14..34];
        assert_eq!(checksum_accumulate(ip_header), 0xFFFF);
    }

    #[test]
    fn test_packet_id_sequence() {
        let mut builder = FrameBuilder::new(NetworkConfig::default());
        let ids: Vec<u16> = (0..3)
            .map(|_| frame_id(&builder.assemble(b"x").unwrap()))
            .collect();

        assert_eq!(ids, vec![8189, 8190, 8191]);
        assert_eq!(builder.next_packet_id(), 8192);
    }

    #[test]
    fn test_packet_id_wraps() {
        let mut builder = FrameBuilder::new(NetworkConfig::default()).with_packet_id_seed(0xFFFF);

        assert_eq!(frame_id(&builder.assemble(&[]).unwrap()), 0xFFFF);
        assert_eq!(frame_id(&builder.assemble(&[]).unwrap()), 0x0000);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let mut builder = FrameBuilder::new(NetworkConfig::default());
        let payload = vec![0u8; DEFAULT_MAX_PAYLOAD + 1];

        let err = builder.assemble(&payload).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferOverflow {
                size: 1025,
                max: 1024
            }
        ));
        // Rejected frames do not consume an identification
        assert_eq!(builder.next_packet_id(), DEFAULT_PACKET_ID_SEED);
    }

    #[test]
    fn test_max_payload_limit() {
        assert!(FrameBuilder::new(NetworkConfig::default())
            .with_max_payload(MAX_UDP_PAYLOAD + 1)
            .is_err());

        let mut builder = FrameBuilder::new(NetworkConfig::default())
            .with_max_payload(MAX_UDP_PAYLOAD)
            .unwrap();
        let frame = builder.assemble(&vec![0u8; MAX_UDP_PAYLOAD]).unwrap();
        assert_eq!(&frame[16..18], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_frame_rejects_oversized() {
        let config = NetworkConfig::default();
        let result = encode_frame(
            &vec![0u8; MAX_UDP_PAYLOAD + 1],
            &config.source,
            &config.destination,
            1,
            ChecksumMode::Rfc768,
        );
        assert!(matches!(result, Err(Error::BufferOverflow { .. })));
    }

    #[test]
    fn test_custom_endpoints() {
        let config = NetworkConfig {
            source: Endpoint::new(
                MacAddress([2, 0, 0, 0, 0, 1]),
                Ipv4Addr::new(10, 0, 0, 1),
                5000,
            ),
            destination: Endpoint::new(MacAddress::BROADCAST, Ipv4Addr::new(10, 0, 0, 255), 6000),
        };
        let mut builder = FrameBuilder::new(config);
        let frame = builder.assemble(b"data").unwrap();

        assert_eq!(&frame[0..6], MacAddress::BROADCAST.as_bytes());
        assert_eq!(&frame[6..12], &[2, 0, 0, 0, 0, 1]);
        assert_eq!(&frame[26..30], &[10, 0, 0, 1]);
        assert_eq!(&frame[30..34], &[10, 0, 0, 255]);
        assert_eq!(u16::from_be_bytes([frame[34], frame[35]]), 5000);
        assert_eq!(u16::from_be_bytes([frame[36], frame[37]]), 6000);
    }

    #[test]
    fn test_legacy_mode_matches_rfc_for_well_formed_frames() {
        let mut legacy = FrameBuilder::new(NetworkConfig::default())
            .with_checksum_mode(ChecksumMode::Legacy);
        let mut rfc = FrameBuilder::new(NetworkConfig::default());

        assert_eq!(legacy.assemble(b"abc").unwrap(), rfc.assemble(b"abc").unwrap());
    }

    proptest! {
        #[test]
        fn prop_frame_length_is_overhead_plus_payload(
            payload in prop::collection::vec(any::<u8>(), 0..=DEFAULT_MAX_PAYLOAD)
        ) {
            let mut builder = FrameBuilder::new(NetworkConfig::default());
            let frame = builder.assemble(&payload).unwrap();

            prop_assert_eq!(frame.len(), FRAME_OVERHEAD + payload.len());
            prop_assert_eq!(&frame[FRAME_OVERHEAD..], &payload[..]);
        }

        #[test]
        fn prop_ip_header_sums_to_ffff(
            seed in any::<u16>(),
            len in 0usize..=DEFAULT_MAX_PAYLOAD
        ) {
            let mut builder = FrameBuilder::new(NetworkConfig::default()).with_packet_id_seed(seed);
            let frame = builder.assemble(&vec![0x5A; len]).unwrap();

            prop_assert_eq!(checksum_accumulate(&frame[14..34]), 0xFFFF);
        }

        #[test]
        fn prop_packet_ids_increment_by_one(seed in any::<u16>(), count in 1usize..16) {
            let mut builder = FrameBuilder::new(NetworkConfig::default()).with_packet_id_seed(seed);
            let mut previous = None;

            for _ in 0..count {
                let id = frame_id(&builder.assemble(&[]).unwrap());
                if let Some(prev) = previous {
                    prop_assert_eq!(id, u16::wrapping_add(prev, 1));
                } else {
                    prop_assert_eq!(id, seed);
                }
                previous = Some(id);
            }
        }
    }
}
