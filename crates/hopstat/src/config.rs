use anyhow::anyhow;
use clap::ValueEnum;
use file::ConfigFile;
use hopstat_core::{defaults, MAX_TTL};
use hopstat_dns::ResolveMethod;
use hopstat_privilege::Privilege;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

mod cmd;
mod constants;
mod file;

pub use cmd::Args;

/// The output mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Print a table of per-hop statistics.
    Table,
    /// Print the per-hop statistics as json.
    Json,
}

/// How DNS queries will be resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DnsResolveMethodConfig {
    /// Resolve using the OS resolver.
    System,
    /// Resolve using the `/etc/resolv.conf` DNS configuration.
    Resolv,
    /// Resolve using the Google `8.8.8.8` DNS service.
    Google,
    /// Resolve using the Cloudflare `1.1.1.1` DNS service.
    Cloudflare,
}

/// How to format log data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
}

/// How to log event spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// Fully parsed and validated configuration.
#[derive(Debug, Eq, PartialEq)]
pub struct HopstatConfig {
    pub target: String,
    pub mode: Mode,
    pub count: usize,
    pub timeout: Duration,
    pub interval: Duration,
    pub hop_sleep: Duration,
    pub max_hops: u8,
    pub max_unknown_hops: u8,
    pub ring_buffer_size: usize,
    pub ptr_lookup: bool,
    pub source_addr: Option<IpAddr>,
    pub interface: Option<String>,
    pub packet_size: u16,
    pub read_timeout: Duration,
    pub initial_sequence: u16,
    pub trace_identifier: u16,
    pub dns_resolve_method: ResolveMethod,
    pub dns_timeout: Duration,
    pub dns_ttl: Duration,
    pub dns_grace_duration: Duration,
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl HopstatConfig {
    pub fn from(args: Args, privilege: &Privilege, pid: u16) -> anyhow::Result<Self> {
        let cfg_file = if let Some(cfg) = &args.config_file {
            file::read_config_file(cfg)?
        } else {
            file::read_default_config_file()?.unwrap_or_default()
        };
        Self::build_config(args, cfg_file, privilege, pid)
    }

    /// The dns resolver configuration.
    pub const fn dns_config(&self) -> hopstat_dns::Config {
        hopstat_dns::Config::new(self.dns_resolve_method, self.dns_timeout, self.dns_ttl)
    }

    fn build_config(
        args: Args,
        cfg_file: ConfigFile,
        privilege: &Privilege,
        pid: u16,
    ) -> anyhow::Result<Self> {
        let cfg_file_hopstat = cfg_file.hopstat.unwrap_or_default();
        let cfg_file_strategy = cfg_file.strategy.unwrap_or_default();
        let cfg_file_dns = cfg_file.dns.unwrap_or_default();
        let mode = if args.json {
            Mode::Json
        } else {
            cfg_layer(args.mode, cfg_file_hopstat.mode, constants::DEFAULT_MODE)
        };
        let verbose = args.verbose;
        let log_format = cfg_layer(
            args.log_format,
            cfg_file_hopstat.log_format,
            constants::DEFAULT_LOG_FORMAT,
        );
        let log_filter = cfg_layer(
            args.log_filter,
            cfg_file_hopstat.log_filter,
            String::from(constants::DEFAULT_LOG_FILTER),
        );
        let log_span_events = cfg_layer(
            args.log_span_events,
            cfg_file_hopstat.log_span_events,
            constants::DEFAULT_LOG_SPAN_EVENTS,
        );
        let count = cfg_layer(args.count, cfg_file_strategy.count, defaults::DEFAULT_COUNT);
        let timeout = cfg_layer(
            args.timeout,
            cfg_file_strategy.timeout,
            defaults::DEFAULT_TIMEOUT,
        );
        let interval = cfg_layer(
            args.interval,
            cfg_file_strategy.interval,
            defaults::DEFAULT_INTERVAL,
        );
        let hop_sleep = cfg_layer(
            args.hop_sleep,
            cfg_file_strategy.hop_sleep,
            defaults::DEFAULT_HOP_SLEEP,
        );
        let max_hops = cfg_layer(
            args.max_hops,
            cfg_file_strategy.max_hops,
            defaults::DEFAULT_MAX_HOPS,
        );
        let max_unknown_hops = cfg_layer(
            args.max_unknown_hops,
            cfg_file_strategy.max_unknown_hops,
            defaults::DEFAULT_MAX_UNKNOWN_HOPS,
        );
        let ring_buffer_size = cfg_layer(
            args.ring_buffer_size,
            cfg_file_strategy.ring_buffer_size,
            defaults::DEFAULT_RING_BUFFER_SIZE,
        );
        let source_addr = cfg_layer_opt(args.source_address, cfg_file_strategy.source_address);
        let interface = cfg_layer_opt(args.interface, cfg_file_strategy.interface);
        let packet_size = cfg_layer(
            args.packet_size,
            cfg_file_strategy.packet_size,
            defaults::DEFAULT_PACKET_SIZE,
        );
        let read_timeout = cfg_layer(
            args.read_timeout,
            cfg_file_strategy.read_timeout,
            defaults::DEFAULT_READ_TIMEOUT,
        );
        let initial_sequence = cfg_layer(
            args.initial_sequence,
            cfg_file_strategy.initial_sequence,
            defaults::DEFAULT_INITIAL_SEQUENCE,
        );
        let ptr_lookup = cfg_layer_bool_flag(
            args.ptr_lookup,
            cfg_file_dns.ptr_lookup,
            defaults::DEFAULT_PTR_LOOKUP,
        );
        let dns_resolve_method_config = cfg_layer(
            args.dns_resolve_method,
            cfg_file_dns.dns_resolve_method,
            constants::DEFAULT_DNS_RESOLVE_METHOD,
        );
        let dns_timeout = cfg_layer(
            args.dns_timeout,
            cfg_file_dns.dns_timeout,
            constants::DEFAULT_DNS_TIMEOUT,
        );
        let dns_ttl = cfg_layer(
            args.dns_ttl,
            cfg_file_dns.dns_ttl,
            constants::DEFAULT_DNS_TTL,
        );
        let dns_grace_duration = cfg_layer(
            args.dns_grace_duration,
            cfg_file_dns.dns_grace_duration,
            defaults::DEFAULT_DNS_GRACE_DURATION,
        );
        validate_privilege(privilege.has_privileges())?;
        validate_count(count)?;
        validate_timeout(timeout)?;
        validate_max_hops(max_hops)?;
        validate_ring_buffer_size(ring_buffer_size)?;
        validate_source_addr(source_addr)?;
        Ok(Self {
            target: args.target,
            mode,
            count,
            timeout,
            interval,
            hop_sleep,
            max_hops,
            max_unknown_hops,
            ring_buffer_size,
            ptr_lookup,
            source_addr,
            interface,
            packet_size,
            read_timeout,
            initial_sequence,
            trace_identifier: pid,
            dns_resolve_method: dns_resolve_method(dns_resolve_method_config),
            dns_timeout,
            dns_ttl,
            dns_grace_duration,
            verbose,
            log_format,
            log_filter,
            log_span_events,
        })
    }
}

impl Default for HopstatConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            mode: constants::DEFAULT_MODE,
            count: defaults::DEFAULT_COUNT,
            timeout: defaults::DEFAULT_TIMEOUT,
            interval: defaults::DEFAULT_INTERVAL,
            hop_sleep: defaults::DEFAULT_HOP_SLEEP,
            max_hops: defaults::DEFAULT_MAX_HOPS,
            max_unknown_hops: defaults::DEFAULT_MAX_UNKNOWN_HOPS,
            ring_buffer_size: defaults::DEFAULT_RING_BUFFER_SIZE,
            ptr_lookup: defaults::DEFAULT_PTR_LOOKUP,
            source_addr: None,
            interface: None,
            packet_size: defaults::DEFAULT_PACKET_SIZE,
            read_timeout: defaults::DEFAULT_READ_TIMEOUT,
            initial_sequence: defaults::DEFAULT_INITIAL_SEQUENCE,
            trace_identifier: 0,
            dns_resolve_method: dns_resolve_method(constants::DEFAULT_DNS_RESOLVE_METHOD),
            dns_timeout: constants::DEFAULT_DNS_TIMEOUT,
            dns_ttl: constants::DEFAULT_DNS_TTL,
            dns_grace_duration: defaults::DEFAULT_DNS_GRACE_DURATION,
            verbose: false,
            log_format: constants::DEFAULT_LOG_FORMAT,
            log_filter: String::from(constants::DEFAULT_LOG_FILTER),
            log_span_events: constants::DEFAULT_LOG_SPAN_EVENTS,
        }
    }
}

const fn dns_resolve_method(dns_resolve_method: DnsResolveMethodConfig) -> ResolveMethod {
    match dns_resolve_method {
        DnsResolveMethodConfig::System => ResolveMethod::System,
        DnsResolveMethodConfig::Resolv => ResolveMethod::Resolv,
        DnsResolveMethodConfig::Google => ResolveMethod::Google,
        DnsResolveMethodConfig::Cloudflare => ResolveMethod::Cloudflare,
    }
}

fn cfg_layer<T>(fst: Option<T>, snd: Option<T>, def: T) -> T {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => val,
        (None, None) => def,
    }
}

fn cfg_layer_opt<T>(fst: Option<T>, snd: Option<T>) -> Option<T> {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => Some(val),
        (None, None) => None,
    }
}

const fn cfg_layer_bool_flag(fst: bool, snd: Option<bool>, default: bool) -> bool {
    match (fst, snd) {
        (true, _) => true,
        (false, Some(val)) => val,
        (false, None) => default,
    }
}

/// Validate privileges.
fn validate_privilege(has_privileges: bool) -> anyhow::Result<()> {
    if has_privileges {
        Ok(())
    } else {
        Err(anyhow!(
            "privileges are required (hint: run as root or grant the CAP_NET_RAW capability)"
        ))
    }
}

/// Validate `count`.
fn validate_count(count: usize) -> anyhow::Result<()> {
    if count == 0 {
        Err(anyhow!("count ({}) must be greater than zero", count))
    } else {
        Ok(())
    }
}

/// Validate `timeout`.
fn validate_timeout(timeout: Duration) -> anyhow::Result<()> {
    if timeout.is_zero() {
        Err(anyhow!(
            "timeout ({}) must be greater than zero",
            humantime::format_duration(timeout)
        ))
    } else {
        Ok(())
    }
}

/// Validate `max_hops`.
fn validate_max_hops(max_hops: u8) -> anyhow::Result<()> {
    if max_hops == 0 || max_hops > MAX_TTL {
        Err(anyhow!(
            "max-hops ({}) must be in the range 1..{}",
            max_hops,
            MAX_TTL
        ))
    } else {
        Ok(())
    }
}

/// Validate `ring_buffer_size`.
fn validate_ring_buffer_size(ring_buffer_size: usize) -> anyhow::Result<()> {
    if ring_buffer_size == 0 {
        Err(anyhow!(
            "ring-buffer-size ({}) must be greater than zero",
            ring_buffer_size
        ))
    } else {
        Ok(())
    }
}

/// Validate the source address is an IPv4 address.
fn validate_source_addr(source_addr: Option<IpAddr>) -> anyhow::Result<()> {
    match source_addr {
        Some(addr @ IpAddr::V6(_)) => Err(anyhow!(
            "source-address ({}) must be an IPv4 address",
            addr
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_config_default() {
        let args = args(&["hopstat", "example.com"]).unwrap();
        let cfg_file = ConfigFile::default();
        let config = HopstatConfig::build_config(args, cfg_file, &dummy_platform(), 0).unwrap();
        let expected = HopstatConfig {
            target: String::from("example.com"),
            ..HopstatConfig::default()
        };
        pretty_assertions::assert_eq!(expected, config);
    }

    #[test]
    fn test_config_sample() {
        let args = args(&["hopstat", "example.com"]).unwrap();
        let cfg_file: ConfigFile =
            toml::from_str(include_str!("../hopstat-config-sample.toml")).unwrap();
        let config = HopstatConfig::build_config(args, cfg_file, &dummy_platform(), 0).unwrap();
        let expected = HopstatConfig {
            target: String::from("example.com"),
            ..HopstatConfig::default()
        };
        pretty_assertions::assert_eq!(expected, config);
    }

    #[test]
    fn test_config_empty_file() {
        let args = args(&["hopstat", "example.com"]).unwrap();
        let cfg_file: ConfigFile = toml::from_str("").unwrap();
        let config = HopstatConfig::build_config(args, cfg_file, &dummy_platform(), 0).unwrap();
        let expected = HopstatConfig {
            target: String::from("example.com"),
            ..HopstatConfig::default()
        };
        pretty_assertions::assert_eq!(expected, config);
    }

    #[test]
    fn test_trace_identifier() {
        let args = args(&["hopstat", "example.com"]).unwrap();
        let config =
            HopstatConfig::build_config(args, ConfigFile::default(), &dummy_platform(), 4321)
                .unwrap();
        assert_eq!(4321, config.trace_identifier);
    }

    #[test]
    fn test_no_privileges() {
        let args = args(&["hopstat", "example.com"]).unwrap();
        let err = HopstatConfig::build_config(args, ConfigFile::default(), &Privilege::new(false), 0)
            .unwrap_err();
        assert_eq!(
            "privileges are required (hint: run as root or grant the CAP_NET_RAW capability)",
            err.to_string()
        );
    }

    #[test_case("hopstat example.com", Ok(cfg().build()); "default mode")]
    #[test_case("hopstat example.com --mode json", Ok(cfg().mode(Mode::Json).build()); "json mode")]
    #[test_case("hopstat example.com -m table", Ok(cfg().mode(Mode::Table).build()); "table mode short")]
    #[test_case("hopstat example.com --json", Ok(cfg().mode(Mode::Json).build()); "json flag")]
    #[test_case("hopstat example.com -j", Ok(cfg().mode(Mode::Json).build()); "json flag short")]
    fn test_mode(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com --json --mode table"; "json flag conflicts with mode")]
    #[test_case("hopstat example.com --mode foo"; "invalid mode")]
    #[test_case("hopstat example.com -A 10.0.0.1 -I eth0"; "source address conflicts with interface")]
    #[test_case("hopstat example.com --timeout soon"; "invalid duration")]
    #[test_case("hopstat example.com --max-hops 256"; "max hops out of range for u8")]
    fn test_invalid_args(cmd: &str) {
        assert!(parse_config(cmd).is_err());
    }

    #[test_case("hopstat example.com --count 20", Ok(cfg().count(20).build()); "custom count")]
    #[test_case("hopstat example.com -C 1", Ok(cfg().count(1).build()); "custom count short")]
    #[test_case("hopstat example.com --count 0", Err(anyhow!("count (0) must be greater than zero")); "invalid zero count")]
    fn test_count(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com --timeout 2s", Ok(cfg().timeout(Duration::from_secs(2)).build()); "custom timeout")]
    #[test_case("hopstat example.com -t 250ms", Ok(cfg().timeout(Duration::from_millis(250)).build()); "custom timeout short")]
    #[test_case("hopstat example.com --timeout 0s", Err(anyhow!("timeout (0s) must be greater than zero")); "invalid zero timeout")]
    fn test_timeout(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com --interval 1s", Ok(cfg().interval(Duration::from_secs(1)).build()); "custom interval")]
    #[test_case("hopstat example.com -i 0ms", Ok(cfg().interval(Duration::ZERO).build()); "zero interval")]
    #[test_case("hopstat example.com --hop-sleep 10ms", Ok(cfg().hop_sleep(Duration::from_millis(10)).build()); "custom hop sleep")]
    fn test_pacing(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com --max-hops 30", Ok(cfg().max_hops(30).build()); "custom max hops")]
    #[test_case("hopstat example.com -M 254", Ok(cfg().max_hops(254).build()); "maximum max hops")]
    #[test_case("hopstat example.com -M 0", Err(anyhow!("max-hops (0) must be in the range 1..254")); "invalid zero max hops")]
    #[test_case("hopstat example.com -M 255", Err(anyhow!("max-hops (255) must be in the range 1..254")); "invalid large max hops")]
    fn test_max_hops(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com --max-unknown-hops 3", Ok(cfg().max_unknown_hops(3).build()); "custom max unknown hops")]
    #[test_case("hopstat example.com -U 1", Ok(cfg().max_unknown_hops(1).build()); "custom max unknown hops short")]
    fn test_max_unknown_hops(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com --ring-buffer-size 10", Ok(cfg().ring_buffer_size(10).build()); "custom ring buffer size")]
    #[test_case("hopstat example.com -s 0", Err(anyhow!("ring-buffer-size (0) must be greater than zero")); "invalid zero ring buffer size")]
    fn test_ring_buffer_size(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com --ptr-lookup", Ok(cfg().ptr_lookup(true).build()); "ptr lookup")]
    #[test_case("hopstat example.com -p", Ok(cfg().ptr_lookup(true).build()); "ptr lookup short")]
    #[test_case("hopstat example.com -r google", Ok(cfg().dns_resolve_method(ResolveMethod::Google).build()); "google resolver")]
    #[test_case("hopstat example.com --dns-resolve-method cloudflare", Ok(cfg().dns_resolve_method(ResolveMethod::Cloudflare).build()); "cloudflare resolver")]
    #[test_case("hopstat example.com --dns-timeout 1s --dns-ttl 10s", Ok(cfg().dns_timeout(Duration::from_secs(1)).dns_ttl(Duration::from_secs(10)).build()); "custom dns timeout and ttl")]
    #[test_case("hopstat example.com --dns-grace-duration 0s", Ok(cfg().dns_grace_duration(Duration::ZERO).build()); "no dns grace")]
    fn test_dns(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com -A 10.0.0.1", Ok(cfg().source_addr(Some(IpAddr::from([10, 0, 0, 1]))).build()); "ipv4 source address")]
    #[test_case("hopstat example.com --source-address ::1", Err(anyhow!("source-address (::1) must be an IPv4 address")); "ipv6 source address")]
    #[test_case("hopstat example.com -I eth0", Ok(cfg().interface(Some(String::from("eth0"))).build()); "custom interface")]
    fn test_source(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com --packet-size 100 --read-timeout 5ms --initial-sequence 100", Ok(cfg().packet_size(100).read_timeout(Duration::from_millis(5)).initial_sequence(100).build()); "custom socket settings")]
    fn test_socket(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("hopstat example.com -v", Ok(cfg().verbose(true).build()); "verbose")]
    #[test_case("hopstat example.com -v --log-format json --log-filter hopstat=trace --log-span-events full", Ok(cfg().verbose(true).log_format(LogFormat::Json).log_filter("hopstat=trace").log_span_events(LogSpanEvents::Full).build()); "custom logging")]
    fn test_logging(cmd: &str, expected: anyhow::Result<HopstatConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test]
    fn test_cmd_overrides_file() {
        let args = args(&["hopstat", "example.com", "--count", "3"]).unwrap();
        let cfg_file: ConfigFile = toml::from_str(
            "[strategy]\ncount = 9\nmax-hops = 20\n[dns]\nptr-lookup = true\n",
        )
        .unwrap();
        let config = HopstatConfig::build_config(args, cfg_file, &dummy_platform(), 0).unwrap();
        let expected = cfg().count(3).max_hops(20).ptr_lookup(true).build();
        pretty_assertions::assert_eq!(expected, config);
    }

    #[test]
    fn test_dns_config() {
        let config = cfg()
            .dns_resolve_method(ResolveMethod::Resolv)
            .dns_timeout(Duration::from_secs(2))
            .dns_ttl(Duration::from_secs(60))
            .build();
        assert_eq!(
            hopstat_dns::Config::new(
                ResolveMethod::Resolv,
                Duration::from_secs(2),
                Duration::from_secs(60)
            ),
            config.dns_config()
        );
    }

    fn parse_config(cmd: &str) -> anyhow::Result<HopstatConfig> {
        let args = parse(cmd)?;
        let cfg_file = ConfigFile::default();
        HopstatConfig::build_config(args, cfg_file, &dummy_platform(), 0)
    }

    fn parse(cmd: &str) -> anyhow::Result<Args> {
        use clap::Parser;
        Ok(Args::try_parse_from(
            cmd.split(' ').map(std::ffi::OsString::from),
        )?)
    }

    fn args(args: &[&str]) -> anyhow::Result<Args> {
        use clap::Parser;
        Ok(Args::try_parse_from(
            args.iter().map(std::ffi::OsString::from),
        )?)
    }

    fn compare<T>(actual: anyhow::Result<T>, expected: anyhow::Result<T>)
    where
        T: PartialEq + Eq + std::fmt::Debug,
    {
        match (actual, expected) {
            (Ok(cfg), Ok(exp)) => {
                pretty_assertions::assert_eq!(cfg, exp);
            }
            (Err(err), Err(exp_err)) => {
                pretty_assertions::assert_eq!(err.to_string(), exp_err.to_string());
            }
            (Ok(_), Err(exp_err)) => {
                panic!("expected err {}", exp_err.to_string().trim());
            }
            (Err(err), Ok(_)) => {
                panic!("unexpected err {}", err.to_string().trim());
            }
        }
    }

    const fn dummy_platform() -> Privilege {
        Privilege::new(true)
    }

    fn cfg() -> HopstatConfigBuilder {
        HopstatConfigBuilder::new(String::from("example.com"))
    }

    pub struct HopstatConfigBuilder {
        config: HopstatConfig,
    }

    macro_rules! setter {
        ($name:ident, $ty:ty) => {
            pub fn $name(self, $name: $ty) -> Self {
                Self {
                    config: HopstatConfig {
                        $name,
                        ..self.config
                    },
                }
            }
        };
    }

    impl HopstatConfigBuilder {
        pub fn new(target: String) -> Self {
            Self {
                config: HopstatConfig {
                    target,
                    ..HopstatConfig::default()
                },
            }
        }

        setter!(mode, Mode);
        setter!(count, usize);
        setter!(timeout, Duration);
        setter!(interval, Duration);
        setter!(hop_sleep, Duration);
        setter!(max_hops, u8);
        setter!(max_unknown_hops, u8);
        setter!(ring_buffer_size, usize);
        setter!(ptr_lookup, bool);
        setter!(source_addr, Option<IpAddr>);
        setter!(interface, Option<String>);
        setter!(packet_size, u16);
        setter!(read_timeout, Duration);
        setter!(initial_sequence, u16);
        setter!(dns_resolve_method, ResolveMethod);
        setter!(dns_timeout, Duration);
        setter!(dns_ttl, Duration);
        setter!(dns_grace_duration, Duration);
        setter!(verbose, bool);
        setter!(log_format, LogFormat);
        setter!(log_span_events, LogSpanEvents);

        pub fn log_filter(self, log_filter: &str) -> Self {
            Self {
                config: HopstatConfig {
                    log_filter: log_filter.to_string(),
                    ..self.config
                },
            }
        }

        pub fn build(self) -> HopstatConfig {
            self.config
        }
    }
}
