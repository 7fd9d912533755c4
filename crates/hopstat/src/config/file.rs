use crate::config::{DnsResolveMethodConfig, LogFormat, LogSpanEvents, Mode};
use anyhow::Context;
use encoding_rs_io::DecodeReaderBytes;
use etcetera::BaseStrategy;
use hopstat_core::defaults;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "hopstat.toml";
const DEFAULT_HIDDEN_CONFIG_FILE: &str = ".hopstat.toml";

/// Read the config from the default location of user config for the platform.
///
/// Returns the parsed `Some(ConfigFile)` if the config file exists, `None` otherwise.
///
/// A `hopstat.toml` or `.hopstat.toml` file is looked for in the current
/// directory, the user home directory, the config directory and finally the
/// `hopstat` directory beneath the config directory.  Only the first file
/// found is used.
pub fn read_default_config_file() -> anyhow::Result<Option<ConfigFile>> {
    use etcetera::base_strategy as base;
    if let Some(file) = read_files("")? {
        Ok(Some(file))
    } else {
        let basedirs = base::choose_base_strategy()?;
        if let Some(file) = read_files(basedirs.home_dir())? {
            Ok(Some(file))
        } else if let Some(file) = read_files(basedirs.config_dir())? {
            Ok(Some(file))
        } else if let Some(file) = read_files(basedirs.config_dir().join("hopstat"))? {
            Ok(Some(file))
        } else {
            Ok(None)
        }
    }
}

/// Read the config from the given path.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> anyhow::Result<ConfigFile> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("config file not found: {}", path.as_ref().display()))?;
    let mut decoder = DecodeReaderBytes::new(BufReader::new(file));
    let mut dest = String::new();
    decoder.read_to_string(&mut dest)?;
    Ok(toml::from_str(&dest)?)
}

fn read_files<P: AsRef<Path>>(dir: P) -> anyhow::Result<Option<ConfigFile>> {
    if let Some(file) = read_file(dir.as_ref(), DEFAULT_CONFIG_FILE)? {
        Ok(Some(file))
    } else if let Some(file) = read_file(dir.as_ref(), DEFAULT_HIDDEN_CONFIG_FILE)? {
        Ok(Some(file))
    } else {
        Ok(None)
    }
}

fn read_file<P: AsRef<Path>>(dir: P, file: &str) -> anyhow::Result<Option<ConfigFile>> {
    let path = dir.as_ref().join(file);
    if path.exists() {
        Ok(Some(read_config_file(path)?))
    } else {
        Ok(None)
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub hopstat: Option<ConfigHopstat>,
    pub strategy: Option<ConfigStrategy>,
    pub dns: Option<ConfigDns>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            hopstat: Some(ConfigHopstat::default()),
            strategy: Some(ConfigStrategy::default()),
            dns: Some(ConfigDns::default()),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigHopstat {
    pub mode: Option<Mode>,
    pub log_format: Option<LogFormat>,
    pub log_filter: Option<String>,
    pub log_span_events: Option<LogSpanEvents>,
}

impl Default for ConfigHopstat {
    fn default() -> Self {
        Self {
            mode: Some(super::constants::DEFAULT_MODE),
            log_format: Some(super::constants::DEFAULT_LOG_FORMAT),
            log_filter: Some(String::from(super::constants::DEFAULT_LOG_FILTER)),
            log_span_events: Some(super::constants::DEFAULT_LOG_SPAN_EVENTS),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigStrategy {
    pub count: Option<usize>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub interval: Option<Duration>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub hop_sleep: Option<Duration>,
    pub max_hops: Option<u8>,
    pub max_unknown_hops: Option<u8>,
    pub ring_buffer_size: Option<usize>,
    #[serde(default)]
    #[serde(deserialize_with = "addr_deser")]
    pub source_address: Option<IpAddr>,
    pub interface: Option<String>,
    pub packet_size: Option<u16>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub read_timeout: Option<Duration>,
    pub initial_sequence: Option<u16>,
}

impl Default for ConfigStrategy {
    fn default() -> Self {
        Self {
            count: Some(defaults::DEFAULT_COUNT),
            timeout: Some(defaults::DEFAULT_TIMEOUT),
            interval: Some(defaults::DEFAULT_INTERVAL),
            hop_sleep: Some(defaults::DEFAULT_HOP_SLEEP),
            max_hops: Some(defaults::DEFAULT_MAX_HOPS),
            max_unknown_hops: Some(defaults::DEFAULT_MAX_UNKNOWN_HOPS),
            ring_buffer_size: Some(defaults::DEFAULT_RING_BUFFER_SIZE),
            source_address: None,
            interface: None,
            packet_size: Some(defaults::DEFAULT_PACKET_SIZE),
            read_timeout: Some(defaults::DEFAULT_READ_TIMEOUT),
            initial_sequence: Some(defaults::DEFAULT_INITIAL_SEQUENCE),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigDns {
    pub ptr_lookup: Option<bool>,
    pub dns_resolve_method: Option<DnsResolveMethodConfig>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub dns_timeout: Option<Duration>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub dns_ttl: Option<Duration>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub dns_grace_duration: Option<Duration>,
}

impl Default for ConfigDns {
    fn default() -> Self {
        Self {
            ptr_lookup: Some(defaults::DEFAULT_PTR_LOOKUP),
            dns_resolve_method: Some(super::constants::DEFAULT_DNS_RESOLVE_METHOD),
            dns_timeout: Some(super::constants::DEFAULT_DNS_TIMEOUT),
            dns_ttl: Some(super::constants::DEFAULT_DNS_TTL),
            dns_grace_duration: Some(defaults::DEFAULT_DNS_GRACE_DURATION),
        }
    }
}

fn humantime_deser<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    humantime::parse_duration(&String::deserialize(deserializer)?)
        .map_err(serde::de::Error::custom)
        .map(Some)
}

fn addr_deser<'de, D>(deserializer: D) -> Result<Option<IpAddr>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    IpAddr::from_str(&String::deserialize(deserializer)?)
        .map_err(serde::de::Error::custom)
        .map(Some)
}
