//! Run loop: read payload chunks, frame them, write pcap records

use std::io::{Read, Write};
use tracing::{debug, info, warn};
use udpcap_capture::{
    LinkType, PcapReader, PcapWriter, RecordClock, StatsAccumulator, TimestampMode, WriterStats,
    DEFAULT_SNAPLEN,
};
use udpcap_core::{read_full, Error, Result};
use udpcap_packet::{
    ChecksumMode, FrameBuilder, NetworkConfig, ParsedFrame, DEFAULT_MAX_PAYLOAD,
    DEFAULT_PACKET_ID_SEED, MAX_UDP_PAYLOAD,
};

/// Default number of payload bytes per frame
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Everything a run needs besides its streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub network: NetworkConfig,
    pub chunk_size: usize,
    pub max_payload: usize,
    pub snaplen: u32,
    pub packet_id_seed: u16,
    pub checksum_mode: ChecksumMode,
    pub timestamp_mode: TimestampMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            network: NetworkConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_payload: DEFAULT_MAX_PAYLOAD,
            snaplen: DEFAULT_SNAPLEN,
            packet_id_seed: DEFAULT_PACKET_ID_SEED,
            checksum_mode: ChecksumMode::default(),
            timestamp_mode: TimestampMode::default(),
        }
    }
}

impl RunOptions {
    /// Check that the sizes are usable together
    pub fn validate(&self) -> Result<()> {
        if self.max_payload > MAX_UDP_PAYLOAD {
            return Err(Error::invalid_parameter(
                "max_payload",
                format!("{} exceeds the UDP limit of {}", self.max_payload, MAX_UDP_PAYLOAD),
            ));
        }
        if self.chunk_size == 0 {
            return Err(Error::invalid_parameter("chunk_size", "must be at least 1"));
        }
        if self.chunk_size > self.max_payload {
            return Err(Error::invalid_parameter(
                "chunk_size",
                format!(
                    "{} exceeds the maximum payload of {}",
                    self.chunk_size, self.max_payload
                ),
            ));
        }
        Ok(())
    }

    fn frame_builder(&self) -> Result<FrameBuilder> {
        Ok(FrameBuilder::new(self.network)
            .with_max_payload(self.max_payload)?
            .with_packet_id_seed(self.packet_id_seed)
            .with_checksum_mode(self.checksum_mode))
    }
}

/// Wrap everything `reader` yields into a capture written to `writer`.
///
/// Each chunk is filled completely unless the input ends first; the run stops
/// at the first zero-byte read without emitting an empty record. The writer
/// is flushed before returning.
pub fn run<R: Read, W: Write>(mut reader: R, writer: W, options: &RunOptions) -> Result<WriterStats> {
    options.validate()?;

    let mut builder = options.frame_builder()?;
    let clock = RecordClock::new(options.timestamp_mode);
    let mut pcap = PcapWriter::with_options(writer, LinkType::Ethernet, options.snaplen, clock)?;
    let mut stats = StatsAccumulator::new();
    let mut chunk = vec![0u8; options.chunk_size];

    info!(
        chunk_size = options.chunk_size,
        packet_id_seed = options.packet_id_seed,
        checksum_mode = ?options.checksum_mode,
        timestamp_mode = ?options.timestamp_mode,
        "starting run"
    );

    loop {
        let n = read_full(&mut reader, &mut chunk)?;
        if n == 0 {
            break;
        }

        let payload = &chunk[..n];
        let frame = builder.assemble(payload)?;
        let ts = pcap.write_frame(&frame)?;
        stats.record_frame(frame.len(), payload.len());

        debug!(
            record = stats.records_written(),
            ts_sec = ts.seconds,
            ts_usec = ts.microseconds,
            len = frame.len(),
            "wrote record"
        );

        // A short chunk means the input already reported end of stream
        if n < chunk.len() {
            break;
        }
    }

    pcap.flush()?;

    let stats = stats.snapshot();
    info!("run complete: {}", stats);
    Ok(stats)
}

/// Totals reported by [`inspect`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectSummary {
    pub records: u64,
    /// Records that did not decode as Ethernet/IPv4/UDP
    pub undecodable: u64,
    /// Records with a failing IP or UDP checksum
    pub bad_checksums: u64,
    /// Records whose IP or UDP length field disagrees with the bytes present
    pub bad_lengths: u64,
}

impl InspectSummary {
    /// Whether every record decoded and verified
    pub fn is_clean(&self) -> bool {
        self.undecodable == 0 && self.bad_checksums == 0 && self.bad_lengths == 0
    }
}

/// Print one line per record of the capture read from `reader`.
pub fn inspect<R: Read, W: Write>(reader: R, out: &mut W) -> Result<InspectSummary> {
    let reader = PcapReader::new(reader)?;
    let header = *reader.header();
    writeln!(
        out,
        "pcap v{}.{} snaplen {} linktype {}",
        header.version_major,
        header.version_minor,
        header.snaplen,
        header.link_type.to_u32()
    )?;

    let mut summary = InspectSummary::default();
    for record in reader {
        let record = record?;
        summary.records += 1;
        let ts = record.header.timestamp();
        write!(
            out,
            "{:>6} {}.{:06} incl={} orig={}",
            summary.records,
            ts.seconds,
            ts.microseconds,
            record.header.incl_len,
            record.header.orig_len
        )?;

        match ParsedFrame::parse(&record.data) {
            Some(frame) => {
                let ip_ok = frame.ip_checksum_valid();
                let udp_ok = frame.udp_checksum_valid();
                if !(ip_ok && udp_ok) {
                    summary.bad_checksums += 1;
                    warn!(record = summary.records, ip_ok, udp_ok, "checksum mismatch");
                }
                let lengths_ok = frame.lengths_consistent();
                if !lengths_ok {
                    summary.bad_lengths += 1;
                    warn!(
                        record = summary.records,
                        ip_total_length = frame.ip.total_length,
                        udp_length = frame.udp.length,
                        "length fields disagree with record size"
                    );
                }
                writeln!(
                    out,
                    " id={} {}:{} -> {}:{} payload={} lengths={} ip_checksum={} udp_checksum={}",
                    frame.ip.identification,
                    frame.ip.source,
                    frame.udp.source_port,
                    frame.ip.destination,
                    frame.udp.destination_port,
                    frame.payload.len(),
                    verdict(lengths_ok),
                    verdict(ip_ok),
                    verdict(udp_ok)
                )?;
            }
            None => {
                summary.undecodable += 1;
                writeln!(out, " not an Ethernet/IPv4/UDP frame")?;
            }
        }
    }

    writeln!(
        out,
        "{} records, {} undecodable, {} with bad checksums, {} with bad lengths",
        summary.records, summary.undecodable, summary.bad_checksums, summary.bad_lengths
    )?;
    Ok(summary)
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "BAD"
    }
}
