//! Textual address decoding
//!
//! These decoders are total: they never fail. Malformed text produces
//! whatever bytes the scan arrives at.

use crate::ethernet::MacAddress;
use std::net::Ipv4Addr;

/// Decode a MAC address from text such as `00:15:c5:09:c7:fd`.
///
/// Hexadecimal digits are consumed left to right and paired into bytes; every
/// other character is treated as a separator and skipped. Digits beyond the
/// sixth byte are ignored and a dangling odd digit is dropped. Bytes that
/// receive no digits stay zero, so empty text yields [`MacAddress::ZERO`].
///
/// # Examples
///
/// ```
/// use udpcap_packet::address::parse_mac;
///
/// assert_eq!(parse_mac("00:15:c5:09:c7:fd").0, [0x00, 0x15, 0xc5, 0x09, 0xc7, 0xfd]);
/// assert_eq!(parse_mac("0015.c509.c7fd").0, [0x00, 0x15, 0xc5, 0x09, 0xc7, 0xfd]);
/// ```
pub fn parse_mac(text: &str) -> MacAddress {
    let mut bytes = [0u8; 6];
    let mut nibbles = text.chars().filter_map(|c| c.to_digit(16)).map(|d| d as u8);

    for byte in bytes.iter_mut() {
        match (nibbles.next(), nibbles.next()) {
            (Some(high), Some(low)) => *byte = (high << 4) | low,
            _ => break,
        }
    }

    MacAddress(bytes)
}

/// Decode a dotted-quad IPv4 address such as `1.2.3.9`.
///
/// Each `.`-separated segment is read as an unsigned decimal number and
/// truncated into its byte without range checks, so `1.2.3.256` decodes to
/// `1.2.3.0`. Missing segments stay zero and segments past the fourth are
/// ignored.
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use udpcap_packet::address::parse_ipv4;
///
/// assert_eq!(parse_ipv4("1.2.3.9"), Ipv4Addr::new(1, 2, 3, 9));
/// ```
pub fn parse_ipv4(text: &str) -> Ipv4Addr {
    let mut octets = [0u8; 4];
    if text.is_empty() {
        return Ipv4Addr::UNSPECIFIED;
    }

    for (octet, segment) in octets.iter_mut().zip(text.split('.')) {
        *octet = decimal_wrapping(segment.bytes()) as u8;
    }

    Ipv4Addr::from(octets)
}

/// Decode a decimal UDP port the way C's `atoi` reads it.
///
/// Leading whitespace and an optional sign are accepted, digits are read up
/// to the first non-digit, and the value wraps into 16 bits. Text without
/// leading digits yields 0.
///
/// # Examples
///
/// ```
/// use udpcap_packet::address::parse_port;
///
/// assert_eq!(parse_port("10012"), 10012);
/// assert_eq!(parse_port("53/udp"), 53);
/// ```
pub fn parse_port(text: &str) -> u16 {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let value = decimal_wrapping(rest.bytes().take_while(u8::is_ascii_digit));
    let value = if negative { value.wrapping_neg() } else { value };

    value as u16
}

/// Accumulates `digits` as a base-10 number with 32-bit wrapping. Bytes that
/// are not ASCII digits contribute their offset from `'0'` unchecked.
fn decimal_wrapping(digits: impl Iterator<Item = u8>) -> u32 {
    digits.fold(0u32, |acc, b| {
        acc.wrapping_mul(10)
            .wrapping_add(u32::from(b.wrapping_sub(b'0')))
    })
}
