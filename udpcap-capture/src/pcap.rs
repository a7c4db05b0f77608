//! pcap container writer and reader
//!
//! Files are always written little endian with microsecond timestamps
//! (magic `0xa1b2c3d4` stored as `d4 c3 b2 a1`), version 2.4.

use crate::clock::{RecordClock, RecordTimestamp};
use bytes::{BufMut, BytesMut};
use std::io::{Read, Write};
use tracing::{debug, warn};
use udpcap_core::{read_full, Error, Result};

/// Magic number for microsecond-resolution captures
pub const PCAP_MAGIC: u32 = 0xa1b2c3d4;
pub const VERSION_MAJOR: u16 = 2;
pub const VERSION_MINOR: u16 = 4;
/// Snapshot length written by default
pub const DEFAULT_SNAPLEN: u32 = 65536;

/// Longest Ethernet frame carrying a maximal IPv4 packet
pub const MAX_ETHERNET_FRAME: u32 = 65535 + 14;

/// Data link type of the records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// LINKTYPE_ETHERNET (1)
    Ethernet,
    /// Any other link type
    Other(u32),
}

impl LinkType {
    pub fn to_u32(self) -> u32 {
        match self {
            LinkType::Ethernet => 1,
            LinkType::Other(val) => val,
        }
    }

    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => LinkType::Ethernet,
            val => LinkType::Other(val),
        }
    }
}

/// The 24-byte header at the start of every capture file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapGlobalHeader {
    pub magic: u32,
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT to local correction
    pub thiszone: i32,
    /// Accuracy of timestamps
    pub sigfigs: u32,
    /// Max length of captured packets, in octets
    pub snaplen: u32,
    pub link_type: LinkType,
}

impl PcapGlobalHeader {
    pub const SIZE: usize = 24;

    pub fn new(link_type: LinkType, snaplen: u32) -> Self {
        PcapGlobalHeader {
            magic: PCAP_MAGIC,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            thiszone: 0,
            sigfigs: 0,
            snaplen,
            link_type,
        }
    }

    /// Append the header to `buffer`
    pub fn write_to(&self, buffer: &mut BytesMut) {
        buffer.put_u32_le(self.magic);
        buffer.put_u16_le(self.version_major);
        buffer.put_u16_le(self.version_minor);
        buffer.put_i32_le(self.thiszone);
        buffer.put_u32_le(self.sigfigs);
        buffer.put_u32_le(self.snaplen);
        buffer.put_u32_le(self.link_type.to_u32());
    }

    /// Parse a global header
    ///
    /// Only little-endian microsecond captures, the kind this crate writes,
    /// are accepted.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::malformed(format!(
                "global header needs {} bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        }

        let magic = le_u32(data, 0);
        if magic != PCAP_MAGIC {
            return Err(Error::malformed(format!("unsupported magic 0x{:08x}", magic)));
        }

        Ok(PcapGlobalHeader {
            magic,
            version_major: u16::from_le_bytes([data[4], data[5]]),
            version_minor: u16::from_le_bytes([data[6], data[7]]),
            thiszone: le_u32(data, 8) as i32,
            sigfigs: le_u32(data, 12),
            snaplen: le_u32(data, 16),
            link_type: LinkType::from_u32(le_u32(data, 20)),
        })
    }
}

impl Default for PcapGlobalHeader {
    fn default() -> Self {
        Self::new(LinkType::Ethernet, DEFAULT_SNAPLEN)
    }
}

/// The 16-byte header in front of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapRecordHeader {
    pub ts_sec: u32,
    pub ts_usec: u32,
    /// Number of octets of packet saved in file
    pub incl_len: u32,
    /// Actual length of packet
    pub orig_len: u32,
}

impl PcapRecordHeader {
    pub const SIZE: usize = 16;

    /// Header for an untruncated frame of `len` bytes
    pub fn new(ts_sec: u32, ts_usec: u32, len: u32) -> Self {
        PcapRecordHeader {
            ts_sec,
            ts_usec,
            incl_len: len,
            orig_len: len,
        }
    }

    /// Append the header to `buffer`
    pub fn write_to(&self, buffer: &mut BytesMut) {
        buffer.put_u32_le(self.ts_sec);
        buffer.put_u32_le(self.ts_usec);
        buffer.put_u32_le(self.incl_len);
        buffer.put_u32_le(self.orig_len);
    }

    /// Parse a record header
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::malformed(format!(
                "record header needs {} bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        }

        Ok(PcapRecordHeader {
            ts_sec: le_u32(data, 0),
            ts_usec: le_u32(data, 4),
            incl_len: le_u32(data, 8),
            orig_len: le_u32(data, 12),
        })
    }

    pub fn timestamp(&self) -> RecordTimestamp {
        RecordTimestamp::new(self.ts_sec, self.ts_usec)
    }
}

fn le_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Write a global header to `w`
pub fn write_global_header<W: Write>(w: &mut W, link_type: LinkType, snaplen: u32) -> Result<()> {
    let mut buffer = BytesMut::with_capacity(PcapGlobalHeader::SIZE);
    PcapGlobalHeader::new(link_type, snaplen).write_to(&mut buffer);
    w.write_all(&buffer)?;
    Ok(())
}

/// Writes a capture file to an exclusively owned output stream.
///
/// The global header is emitted once, when the writer is created. Writes are
/// not buffered here; wrap the stream in a `BufWriter` for that.
///
/// # Examples
///
/// ```
/// use udpcap_capture::PcapWriter;
///
/// let mut writer = PcapWriter::new(Vec::new()).unwrap();
/// writer.write_record(&[0u8; 42], 1_700_000_000, 0).unwrap();
///
/// let bytes = writer.into_inner();
/// assert_eq!(bytes.len(), 24 + 16 + 42);
/// assert_eq!(&bytes[0..4], &[0xd4, 0xc3, 0xb2, 0xa1]);
/// ```
pub struct PcapWriter<W: Write> {
    w: W,
    header: PcapGlobalHeader,
    clock: RecordClock,
    records: u64,
    buffer: BytesMut,
}

impl<W: Write> PcapWriter<W> {
    /// Create a writer for Ethernet frames with the default snapshot length
    /// and run-start timestamps
    pub fn new(w: W) -> Result<Self> {
        Self::with_header(w, PcapGlobalHeader::default(), RecordClock::default())
    }

    /// Create a writer with an explicit link type, snapshot length and clock
    pub fn with_options(w: W, link_type: LinkType, snaplen: u32, clock: RecordClock) -> Result<Self> {
        Self::with_header(w, PcapGlobalHeader::new(link_type, snaplen), clock)
    }

    fn with_header(mut w: W, header: PcapGlobalHeader, clock: RecordClock) -> Result<Self> {
        let mut buffer = BytesMut::with_capacity(PcapGlobalHeader::SIZE);
        header.write_to(&mut buffer);
        w.write_all(&buffer)?;

        debug!(
            link_type = header.link_type.to_u32(),
            snaplen = header.snaplen,
            "wrote pcap global header"
        );

        buffer.clear();
        Ok(PcapWriter {
            w,
            header,
            clock,
            records: 0,
            buffer,
        })
    }

    /// Write one record: the record header followed by the frame bytes.
    ///
    /// If this write fails the file ends in a partial record and no further
    /// writes should be attempted.
    pub fn write_record(&mut self, frame: &[u8], ts_sec: u32, ts_usec: u32) -> Result<()> {
        let len = u32::try_from(frame.len()).map_err(|_| Error::BufferOverflow {
            size: frame.len(),
            max: u32::MAX as usize,
        })?;

        if len > self.header.snaplen {
            warn!(
                len,
                snaplen = self.header.snaplen,
                "frame longer than snapshot length, written untruncated"
            );
        }

        self.buffer.clear();
        PcapRecordHeader::new(ts_sec, ts_usec, len).write_to(&mut self.buffer);
        self.w.write_all(&self.buffer)?;
        self.w.write_all(frame)?;

        self.records += 1;
        Ok(())
    }

    /// Write one record stamped by the writer's clock
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<RecordTimestamp> {
        let ts = self.clock.next_timestamp();
        self.write_record(frame, ts.seconds, ts.microseconds)?;
        Ok(ts)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.w.flush()?;
        Ok(())
    }

    pub fn header(&self) -> &PcapGlobalHeader {
        &self.header
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    pub fn get_ref(&self) -> &W {
        &self.w
    }

    pub fn into_inner(self) -> W {
        self.w
    }
}

/// A record read back from a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcapRecord {
    pub header: PcapRecordHeader,
    pub data: Vec<u8>,
}

/// Reads capture files written by [`PcapWriter`]
pub struct PcapReader<R: Read> {
    r: R,
    header: PcapGlobalHeader,
}

impl<R: Read> PcapReader<R> {
    /// Read and validate the global header
    pub fn new(mut r: R) -> Result<Self> {
        let mut bytes = [0u8; PcapGlobalHeader::SIZE];
        let n = read_full(&mut r, &mut bytes)?;
        let header = PcapGlobalHeader::from_bytes(&bytes[..n])?;
        Ok(PcapReader { r, header })
    }

    pub fn header(&self) -> &PcapGlobalHeader {
        &self.header
    }

    /// Largest `incl_len` accepted before any record data is allocated
    pub fn max_record_len(&self) -> u32 {
        self.header.snaplen.max(MAX_ETHERNET_FRAME)
    }

    /// Read the next record, or `None` at a clean end of file
    pub fn next_record(&mut self) -> Result<Option<PcapRecord>> {
        let mut bytes = [0u8; PcapRecordHeader::SIZE];
        let n = read_full(&mut self.r, &mut bytes)?;
        if n == 0 {
            return Ok(None);
        }
        let header = PcapRecordHeader::from_bytes(&bytes[..n])?;

        if header.incl_len > self.max_record_len() {
            return Err(Error::malformed(format!(
                "record length {} exceeds the limit of {} bytes",
                header.incl_len,
                self.max_record_len()
            )));
        }

        let mut data = vec![0u8; header.incl_len as usize];
        let n = read_full(&mut self.r, &mut data)?;
        if n < data.len() {
            return Err(Error::malformed(format!(
                "record data truncated: expected {} bytes, got {}",
                data.len(),
                n
            )));
        }

        Ok(Some(PcapRecord { header, data }))
    }
}

impl<R: Read> Iterator for PcapReader<R> {
    type Item = Result<PcapRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
