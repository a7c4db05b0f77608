//! Example: Building a UDP frame
//!
//! This example demonstrates how to use the udpcap-packet crate to build
//! a complete Ethernet/IPv4/UDP frame from textual addresses.

use udpcap_packet::address::{parse_ipv4, parse_mac, parse_port};
use udpcap_packet::{Endpoint, FrameBuilder, NetworkConfig, ParsedFrame};

fn main() {
    let config = NetworkConfig {
        source: Endpoint::new(
            parse_mac("00:11:22:33:44:55"),
            parse_ipv4("192.168.1.100"),
            parse_port("54321"),
        ),
        destination: Endpoint::new(
            parse_mac("aa:bb:cc:dd:ee:ff"),
            parse_ipv4("192.168.1.1"),
            parse_port("53"),
        ),
    };

    // DNS query payload (simplified)
    let dns_query = [
        0x12, 0x34, // Transaction ID
        0x01, 0x00, // Flags: standard query
        0x00, 0x01, // Questions: 1
        0x00, 0x00, // Answer RRs: 0
        0x00, 0x00, // Authority RRs: 0
        0x00, 0x00, // Additional RRs: 0
    ];

    let mut builder = FrameBuilder::new(config);
    let frame = match builder.assemble(&dns_query) {
        Ok(frame) => frame,
        Err(e) => {
            eprintln!("Failed to build frame: {}", e);
            return;
        }
    };

    println!("Frame built successfully!");
    println!("Total size: {} bytes", frame.len());
    println!("Ethernet header: {:02X?}", &frame[..14]);

    if let Some(parsed) = ParsedFrame::parse(&frame) {
        println!("MAC: {} -> {}", parsed.ethernet.source, parsed.ethernet.destination);
        println!("IP identification: {}", parsed.ip.identification);
        println!("IP checksum: 0x{:04X}", parsed.ip.checksum);
        println!("UDP checksum: 0x{:04X}", parsed.udp.checksum);
        println!(
            "Checksums valid: ip={} udp={}",
            parsed.ip_checksum_valid(),
            parsed.udp_checksum_valid()
        );
    }
}
