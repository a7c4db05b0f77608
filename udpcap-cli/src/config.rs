//! Layered configuration: built-in defaults, then the YAML file, then flags
//!
//! Addresses and ports stay textual until they are merged so that file and
//! command-line values go through the same decoders.

use crate::args::Cli;
use crate::driver::RunOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;
use udpcap_capture::TimestampMode;
use udpcap_core::{Error, Result};
use udpcap_packet::address::{parse_ipv4, parse_mac, parse_port};
use udpcap_packet::{ChecksumMode, Endpoint};

/// A port given either as a YAML number or as text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(i64),
    Text(String),
}

impl PortValue {
    fn decode(&self) -> u16 {
        match self {
            PortValue::Number(n) => parse_port(&n.to_string()),
            PortValue::Text(text) => parse_port(text),
        }
    }
}

/// One endpoint section of the file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub mac: Option<String>,
    pub ip: Option<String>,
    pub port: Option<PortValue>,
}

/// Contents of a `--config` file. Every key is optional.
///
/// ```yaml
/// source:
///   mac: "00:15:c5:09:c7:fd"
///   ip: 1.2.3.9
///   port: 10012
/// destination:
///   ip: 1.2.3.4
/// chunk_size: 512
/// legacy_checksum: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<EndpointConfig>,
    pub destination: Option<EndpointConfig>,
    pub chunk_size: Option<usize>,
    pub max_payload: Option<usize>,
    pub snaplen: Option<u32>,
    pub packet_id_seed: Option<u16>,
    pub legacy_checksum: Option<bool>,
    pub per_record_timestamps: Option<bool>,
}

impl FileConfig {
    /// Parse YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("can't read {}: {}", path.display(), e)))?;
        let config: FileConfig = serde_yaml_ng::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Overlay the values present in this file onto `options`
    pub fn apply(&self, options: &mut RunOptions) {
        if let Some(source) = &self.source {
            apply_endpoint(
                &mut options.network.source,
                source.mac.as_deref(),
                source.ip.as_deref(),
                source.port.as_ref().map(PortValue::decode),
            );
        }
        if let Some(destination) = &self.destination {
            apply_endpoint(
                &mut options.network.destination,
                destination.mac.as_deref(),
                destination.ip.as_deref(),
                destination.port.as_ref().map(PortValue::decode),
            );
        }

        if let Some(chunk_size) = self.chunk_size {
            options.chunk_size = chunk_size;
        }
        if let Some(max_payload) = self.max_payload {
            options.max_payload = max_payload;
        }
        if let Some(snaplen) = self.snaplen {
            options.snaplen = snaplen;
        }
        if let Some(seed) = self.packet_id_seed {
            options.packet_id_seed = seed;
        }
        if let Some(legacy) = self.legacy_checksum {
            options.checksum_mode = checksum_mode(legacy);
        }
        if let Some(per_record) = self.per_record_timestamps {
            options.timestamp_mode = timestamp_mode(per_record);
        }
    }
}

fn apply_endpoint(endpoint: &mut Endpoint, mac: Option<&str>, ip: Option<&str>, port: Option<u16>) {
    if let Some(mac) = mac {
        endpoint.mac = parse_mac(mac);
    }
    if let Some(ip) = ip {
        endpoint.ip = parse_ipv4(ip);
    }
    if let Some(port) = port {
        endpoint.port = port;
    }
}

fn checksum_mode(legacy: bool) -> ChecksumMode {
    if legacy {
        ChecksumMode::Legacy
    } else {
        ChecksumMode::Rfc768
    }
}

fn timestamp_mode(per_record: bool) -> TimestampMode {
    if per_record {
        TimestampMode::PerRecord
    } else {
        TimestampMode::RunStart
    }
}

/// Overlay command-line flags onto `options`
pub fn apply_flags(cli: &Cli, options: &mut RunOptions) {
    apply_endpoint(
        &mut options.network.source,
        cli.src_mac.as_deref(),
        cli.src_ip.as_deref(),
        cli.src_port.as_deref().map(parse_port),
    );
    apply_endpoint(
        &mut options.network.destination,
        cli.dst_mac.as_deref(),
        cli.dst_ip.as_deref(),
        cli.dst_port.as_deref().map(parse_port),
    );

    if let Some(chunk_size) = cli.chunk_size {
        options.chunk_size = chunk_size;
    }
    if let Some(max_payload) = cli.max_payload {
        options.max_payload = max_payload;
    }
    if let Some(snaplen) = cli.snaplen {
        options.snaplen = snaplen;
    }
    if let Some(seed) = cli.packet_id_seed {
        options.packet_id_seed = seed;
    }
    // Boolean flags can only switch a mode on
    if cli.legacy_checksum {
        options.checksum_mode = ChecksumMode::Legacy;
    }
    if cli.per_record_timestamps {
        options.timestamp_mode = TimestampMode::PerRecord;
    }
}

/// Resolve the options for a run from defaults, the optional config file and
/// the flags, then validate them.
pub fn resolve(cli: &Cli) -> Result<RunOptions> {
    let mut options = RunOptions::default();

    if let Some(path) = &cli.config {
        FileConfig::load(path)?.apply(&mut options);
    }
    apply_flags(cli, &mut options);

    options.validate()?;
    debug!(?options, "resolved run options");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use udpcap_packet::MacAddress;

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = FileConfig::from_yaml_str("{}").unwrap();
        let mut options = RunOptions::default();
        config.apply(&mut options);
        assert_eq!(options, RunOptions::default());
    }

    #[test]
    fn test_file_overrides() {
        let yaml = r#"
source:
  mac: "02:00:00:00:00:01"
  ip: 10.0.0.1
  port: 5000
destination:
  port: "6000"
chunk_size: 512
snaplen: 1500
packet_id_seed: 1
legacy_checksum: true
per_record_timestamps: true
"#;
        let config = FileConfig::from_yaml_str(yaml).unwrap();
        let mut options = RunOptions::default();
        config.apply(&mut options);

        assert_eq!(options.network.source.mac, MacAddress([2, 0, 0, 0, 0, 1]));
        assert_eq!(options.network.source.ip, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(options.network.source.port, 5000);
        assert_eq!(options.network.destination.port, 6000);
        // Untouched destination fields keep their defaults
        assert_eq!(options.network.destination.ip, Ipv4Addr::new(1, 2, 3, 4));
        assert_eq!(options.chunk_size, 512);
        assert_eq!(options.snaplen, 1500);
        assert_eq!(options.packet_id_seed, 1);
        assert_eq!(options.checksum_mode, ChecksumMode::Legacy);
        assert_eq!(options.timestamp_mode, TimestampMode::PerRecord);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            FileConfig::from_yaml_str("chunk: 10"),
            Err(Error::Config(_))
        ));
        assert!(FileConfig::from_yaml_str("source: { address: 1.2.3.4 }").is_err());
    }

    #[test]
    fn test_port_number_wraps() {
        let config = FileConfig::from_yaml_str("source: { port: 65537 }").unwrap();
        let mut options = RunOptions::default();
        config.apply(&mut options);
        assert_eq!(options.network.source.port, 1);
    }

    #[test]
    fn test_flags_override_file() {
        let config = FileConfig::from_yaml_str("chunk_size: 512\nsource: { ip: 10.0.0.1 }").unwrap();
        let cli = Cli {
            chunk_size: Some(256),
            src_ip: Some("192.168.0.7".to_string()),
            dst_mac: Some("ff:ff:ff:ff:ff:ff".to_string()),
            ..Cli::default()
        };

        let mut options = RunOptions::default();
        config.apply(&mut options);
        apply_flags(&cli, &mut options);

        assert_eq!(options.chunk_size, 256);
        assert_eq!(options.network.source.ip, Ipv4Addr::new(192, 168, 0, 7));
        assert_eq!(options.network.destination.mac, MacAddress::BROADCAST);
    }

    #[test]
    fn test_resolve_validates() {
        let cli = Cli {
            chunk_size: Some(0),
            ..Cli::default()
        };
        assert!(matches!(
            resolve(&cli),
            Err(Error::InvalidParameter { .. })
        ));

        let options = resolve(&Cli::default()).unwrap();
        assert_eq!(options, RunOptions::default());
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli {
            config: Some("/nonexistent/udpcap.yaml".into()),
            ..Cli::default()
        };
        assert!(matches!(resolve(&cli), Err(Error::Config(_))));
    }
}
