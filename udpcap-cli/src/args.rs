//! CLI argument parsing
//!
//! Flags override values from the `--config` file, which in turn override
//! the built-in defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "udpcap")]
#[command(
    version,
    about = "Wrap a byte stream into a pcap of Ethernet/IPv4/UDP frames",
    long_about = None
)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short = 'q', long, conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    /// YAML configuration file
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read payload from a file instead of stdin
    #[arg(short = 'i', long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Write the capture to a file instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Source MAC address
    #[arg(long, value_name = "MAC")]
    pub src_mac: Option<String>,

    /// Source IPv4 address
    #[arg(long, value_name = "IP")]
    pub src_ip: Option<String>,

    /// Source UDP port
    #[arg(long, value_name = "PORT")]
    pub src_port: Option<String>,

    /// Destination MAC address
    #[arg(long, value_name = "MAC")]
    pub dst_mac: Option<String>,

    /// Destination IPv4 address
    #[arg(long, value_name = "IP")]
    pub dst_ip: Option<String>,

    /// Destination UDP port
    #[arg(long, value_name = "PORT")]
    pub dst_port: Option<String>,

    /// Payload bytes per frame
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Largest payload the frame builder accepts
    #[arg(long, value_name = "BYTES")]
    pub max_payload: Option<usize>,

    /// Snapshot length written to the global header
    #[arg(long, value_name = "BYTES")]
    pub snaplen: Option<u32>,

    /// IP identification of the first frame
    #[arg(long, value_name = "ID")]
    pub packet_id_seed: Option<u16>,

    /// Derive the UDP pseudo-header length from the IP total length and
    /// transmit a zero checksum as zero
    #[arg(long)]
    pub legacy_checksum: bool,

    /// Sample wall-clock time for every record
    #[arg(long)]
    pub per_record_timestamps: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the records of a capture and verify their checksums
    Inspect {
        /// Capture file to read
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log filter directive for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "off";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "udpcap",
            "-vv",
            "--input",
            "in.bin",
            "--src-ip",
            "10.0.0.1",
            "--dst-port",
            "53",
            "--chunk-size",
            "512",
            "--legacy-checksum",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.input, Some(PathBuf::from("in.bin")));
        assert_eq!(cli.src_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(cli.dst_port.as_deref(), Some("53"));
        assert_eq!(cli.chunk_size, Some(512));
        assert!(cli.legacy_checksum);
        assert!(!cli.per_record_timestamps);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::try_parse_from(["udpcap", "inspect", "out.pcap"]).unwrap();
        match cli.command {
            Some(Commands::Inspect { file }) => assert_eq!(file, PathBuf::from("out.pcap")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_log_level() {
        let mut cli = Cli::default();
        assert_eq!(cli.log_level(), "warn");
        cli.verbose = 1;
        assert_eq!(cli.log_level(), "info");
        cli.verbose = 5;
        assert_eq!(cli.log_level(), "trace");
        cli.quiet = true;
        assert_eq!(cli.log_level(), "off");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["udpcap", "-q", "-v"]).is_err());
    }
}
