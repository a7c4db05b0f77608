//! Record timestamp policy

use chrono::Utc;

const MICROS_PER_SECOND: u64 = 1_000_000;

/// How record timestamps are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampMode {
    /// Seconds sampled once when the run starts; microseconds count records
    /// 0, 1, 2, ... and carry into the seconds.
    #[default]
    RunStart,
    /// Wall-clock time sampled for every record
    PerRecord,
}

/// A pcap record timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordTimestamp {
    pub seconds: u32,
    /// Always below 1_000_000
    pub microseconds: u32,
}

impl RecordTimestamp {
    pub fn new(seconds: u32, microseconds: u32) -> Self {
        RecordTimestamp {
            seconds,
            microseconds,
        }
    }

    /// Current wall-clock time. Seconds saturate at `u32::MAX`.
    pub fn now() -> Self {
        let now = Utc::now();
        let seconds = now.timestamp().clamp(0, u32::MAX as i64) as u32;
        // Leap seconds report 1_000_000 and above
        let microseconds = now.timestamp_subsec_micros().min(999_999);
        RecordTimestamp::new(seconds, microseconds)
    }
}

/// Produces one timestamp per record according to a [`TimestampMode`]
#[derive(Debug, Clone)]
pub struct RecordClock {
    mode: TimestampMode,
    start_seconds: u32,
    issued: u64,
}

impl RecordClock {
    /// Create a clock whose run start is the current time
    pub fn new(mode: TimestampMode) -> Self {
        Self::starting_at(mode, RecordTimestamp::now().seconds)
    }

    /// Create a clock with an explicit run start
    pub fn starting_at(mode: TimestampMode, start_seconds: u32) -> Self {
        RecordClock {
            mode,
            start_seconds,
            issued: 0,
        }
    }

    pub fn mode(&self) -> TimestampMode {
        self.mode
    }

    pub fn start_seconds(&self) -> u32 {
        self.start_seconds
    }

    /// Timestamp for the next record
    pub fn next_timestamp(&mut self) -> RecordTimestamp {
        let index = self.issued;
        self.issued += 1;

        match self.mode {
            TimestampMode::RunStart => {
                let carry = (index / MICROS_PER_SECOND) as u32;
                RecordTimestamp::new(
                    self.start_seconds.wrapping_add(carry),
                    (index % MICROS_PER_SECOND) as u32,
                )
            }
            TimestampMode::PerRecord => RecordTimestamp::now(),
        }
    }
}

impl Default for RecordClock {
    fn default() -> Self {
        Self::new(TimestampMode::default())
    }
}
