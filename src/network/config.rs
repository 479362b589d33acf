use std::{collections::HashMap, fs, net::Ipv4Addr, path::Path};

use log::LevelFilter;
use serde::Deserialize;
use strum::IntoEnumIterator;

use super::{error::NetError, logger::Source, stack::DEFAULT_PERIODIC_INTERVAL_MS, utils::MacAddress};

/// Addresses of the single interface this stack serves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkIdentity {
    pub mac: MacAddress,
    pub ipv4: Ipv4Addr,
    pub gateway_ipv4: Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Minimum time between two cache aging passes.
    pub periodic_interval_ms: u32,
    pub arp_request_interval_ms: u32,
    pub poll_delay_ms: u64,
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig {
            periodic_interval_ms: DEFAULT_PERIODIC_INTERVAL_MS,
            arp_request_interval_ms: 2000,
            poll_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LogConfig {
    levels: HashMap<Source, LevelFilter>,
}

impl LogConfig {
    pub fn level(&self, src: Source) -> LevelFilter {
        self.levels
            .get(&src)
            .copied()
            .unwrap_or_else(|| src.default_level())
    }

    pub fn set_level(&mut self, src: Source, level: LevelFilter) {
        self.levels.insert(src, level);
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            levels: Source::iter().map(|src| (src, src.default_level())).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub identity: NetworkIdentity,
    #[serde(default)]
    pub stack: StackConfig,
    #[serde(default)]
    pub logging: LogConfig,
    /// Components allowed to log. Empty means all of them.
    #[serde(default)]
    pub log_sources: Vec<Source>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Config, NetError> {
        serde_yaml::from_str(yaml).map_err(|e| NetError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, NetError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|e| NetError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Config::from_yaml(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(
            r#"
identity:
  mac: "F4:7B:09:51:91:63"
  ipv4: 192.168.18.30
  gateway_ipv4: 192.168.18.1
stack:
  periodic_interval_ms: 1000
  arp_request_interval_ms: 5000
  poll_delay_ms: 10
logging:
  HAL: WARN
  ARP: TRACE
log_sources: [ARP, NET]
"#,
        )
        .unwrap();

        assert_eq!(
            config.identity,
            NetworkIdentity {
                mac: MacAddress([0xF4, 0x7B, 0x09, 0x51, 0x91, 0x63]),
                ipv4: Ipv4Addr::new(192, 168, 18, 30),
                gateway_ipv4: Ipv4Addr::new(192, 168, 18, 1),
            }
        );
        assert_eq!(
            config.stack,
            StackConfig {
                periodic_interval_ms: 1000,
                arp_request_interval_ms: 5000,
                poll_delay_ms: 10
            }
        );
        assert_eq!(config.logging.level(Source::HAL), LevelFilter::Warn);
        assert_eq!(config.logging.level(Source::ARP), LevelFilter::Trace);
        // missing components fall back to their defaults
        assert_eq!(config.logging.level(Source::NET), LevelFilter::Debug);
        assert_eq!(config.log_sources, vec![Source::ARP, Source::NET]);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml(
            r#"
identity:
  mac: "02:00:00:00:00:01"
  ipv4: 10.0.0.2
  gateway_ipv4: 10.0.0.1
stack:
  poll_delay_ms: 5
"#,
        )
        .unwrap();

        assert_eq!(config.stack.periodic_interval_ms, 2000);
        assert_eq!(config.stack.arp_request_interval_ms, 2000);
        assert_eq!(config.stack.poll_delay_ms, 5);
        assert_eq!(config.logging, LogConfig::default());
        assert_eq!(config.logging.level(Source::HAL), LevelFilter::Info);
        assert!(config.log_sources.is_empty());
    }

    #[test]
    fn test_shipped_config() {
        let config = Config::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/config/netconfig.yaml")).unwrap();
        assert_eq!(config.identity.gateway_ipv4, Ipv4Addr::new(10, 23, 42, 1));
        assert_eq!(config.stack, StackConfig::default());
        assert_eq!(config.logging, LogConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        let bad_mac = Config::from_yaml(
            r#"
identity:
  mac: "02:00:00:00:01"
  ipv4: 10.0.0.2
  gateway_ipv4: 10.0.0.1
"#,
        );
        assert!(matches!(bad_mac, Err(NetError::Config(_))));

        let missing_identity = Config::from_yaml("stack:\n  poll_delay_ms: 5\n");
        assert!(matches!(missing_identity, Err(NetError::Config(_))));

        assert!(matches!(
            Config::from_file("does/not/exist.yaml"),
            Err(NetError::Config(_))
        ));
    }
}
