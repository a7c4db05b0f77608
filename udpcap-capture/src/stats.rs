//! Writer statistics

use std::fmt;
use std::time::{Duration, Instant};

/// Statistics for a pcap writing run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriterStats {
    /// Number of records written
    pub records_written: u64,
    /// Payload bytes carried by the records
    pub payload_bytes: u64,
    /// Frame bytes written (headers + payload), excluding record headers
    pub frame_bytes: u64,
    /// Run duration
    pub duration: Duration,
}

impl WriterStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            records_written: 0,
            payload_bytes: 0,
            frame_bytes: 0,
            duration: Duration::from_secs(0),
        }
    }

    /// Records per second over the run
    pub fn records_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.records_written as f64 / secs
        } else {
            0.0
        }
    }

    /// Bytes of capture file produced, global header included
    pub fn file_bytes(&self) -> u64 {
        crate::pcap::PcapGlobalHeader::SIZE as u64
            + self.records_written * crate::pcap::PcapRecordHeader::SIZE as u64
            + self.frame_bytes
    }
}

impl Default for WriterStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records ({} payload bytes, {} frame bytes) in {:.2}s, {:.2} records/s",
            self.records_written,
            self.payload_bytes,
            self.frame_bytes,
            self.duration.as_secs_f64(),
            self.records_per_second()
        )
    }
}

/// Statistics accumulator for a single writer
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    records_written: u64,
    payload_bytes: u64,
    frame_bytes: u64,
    start_time: Instant,
}

impl StatsAccumulator {
    /// Create a new statistics accumulator
    pub fn new() -> Self {
        Self {
            records_written: 0,
            payload_bytes: 0,
            frame_bytes: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a written frame
    pub fn record_frame(&mut self, frame_len: usize, payload_len: usize) {
        self.records_written += 1;
        self.frame_bytes += frame_len as u64;
        self.payload_bytes += payload_len as u64;
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> WriterStats {
        WriterStats {
            records_written: self.records_written,
            payload_bytes: self.payload_bytes,
            frame_bytes: self.frame_bytes,
            duration: self.start_time.elapsed(),
        }
    }

    /// Get records written count
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_writer_stats_new() {
        let stats = WriterStats::new();
        assert_eq!(stats.records_written, 0);
        assert_eq!(stats.frame_bytes, 0);
        assert_eq!(stats.records_per_second(), 0.0);
        assert_eq!(stats.file_bytes(), 24);
    }

    #[test]
    fn test_file_bytes() {
        let stats = WriterStats {
            records_written: 2,
            payload_bytes: 2048,
            frame_bytes: 2048 + 84,
            duration: Duration::from_secs(1),
        };
        assert_eq!(stats.file_bytes(), 24 + 2 * 16 + 2132);
    }

    #[test]
    fn test_stats_display() {
        let stats = WriterStats {
            records_written: 10,
            payload_bytes: 10240,
            frame_bytes: 10660,
            duration: Duration::from_secs(2),
        };

        let formatted = stats.to_string();
        assert!(formatted.contains("10 records"));
        assert!(formatted.contains("10240 payload bytes"));
        assert!(formatted.contains("5.00 records/s"));
    }

    #[test]
    fn test_accumulator_counts() {
        let mut acc = StatsAccumulator::new();
        acc.record_frame(1066, 1024);
        acc.record_frame(42, 0);

        let snapshot = acc.snapshot();
        assert_eq!(acc.records_written(), 2);
        assert_eq!(snapshot.records_written, 2);
        assert_eq!(snapshot.payload_bytes, 1024);
        assert_eq!(snapshot.frame_bytes, 1108);
    }

    #[test]
    fn test_accumulator_rates() {
        let mut acc = StatsAccumulator::new();

        // Wait a bit to ensure non-zero duration
        thread::sleep(Duration::from_millis(10));
        acc.record_frame(100, 58);

        assert!(acc.snapshot().records_per_second() > 0.0);
    }
}
