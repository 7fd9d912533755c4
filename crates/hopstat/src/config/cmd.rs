use crate::config::{DnsResolveMethodConfig, LogFormat, LogSpanEvents, Mode};
use clap::builder::Styles;
use clap::Parser;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Measure the packet loss and latency of every hop on the path to a host
#[derive(Parser, Debug)]
#[command(name = "hopstat", author, version, about, long_about = None, arg_required_else_help(true), styles=Styles::styled())]
pub struct Args {
    /// The hostname or IPv4 address to probe
    pub target: String,

    /// Config file
    #[arg(short = 'c', long, value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<String>,

    /// Output mode [default: table]
    #[arg(value_enum, short = 'm', long)]
    pub mode: Option<Mode>,

    /// Output as json
    #[arg(short = 'j', long, conflicts_with = "mode")]
    pub json: bool,

    /// The number of probing rounds [default: 5]
    #[arg(short = 'C', long)]
    pub count: Option<usize>,

    /// How long to wait for a reply to each probe [default: 800ms]
    #[arg(short = 't', long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// The pause between rounds [default: 100ms]
    #[arg(short = 'i', long, value_parser = parse_duration)]
    pub interval: Option<Duration>,

    /// The minimum time between successive probes within a round [default: 1ns]
    #[arg(long, value_parser = parse_duration)]
    pub hop_sleep: Option<Duration>,

    /// The maximum number of hops to probe [default: 64]
    #[arg(short = 'M', long)]
    pub max_hops: Option<u8>,

    /// The number of consecutive silent hops after which the run stops [default: 10]
    #[arg(short = 'U', long)]
    pub max_unknown_hops: Option<u8>,

    /// The number of recent samples kept per hop [default: 50]
    #[arg(short = 's', long)]
    pub ring_buffer_size: Option<usize>,

    /// Resolve the hostname of every hop [default: false]
    #[arg(short = 'p', long)]
    pub ptr_lookup: bool,

    /// The source IPv4 address [default: auto]
    #[arg(short = 'A', long, value_parser = parse_addr, conflicts_with = "interface")]
    pub source_address: Option<IpAddr>,

    /// The network interface [default: auto]
    #[arg(short = 'I', long)]
    pub interface: Option<String>,

    /// The packet size (IP header + ICMP header + payload) [default: 84]
    #[arg(long)]
    pub packet_size: Option<u16>,

    /// The socket read timeout [default: 10ms]
    #[arg(long, value_parser = parse_duration)]
    pub read_timeout: Option<Duration>,

    /// The initial sequence number [default: 33434]
    #[arg(long)]
    pub initial_sequence: Option<u16>,

    /// How to perform DNS queries [default: system]
    #[arg(value_enum, short = 'r', long)]
    pub dns_resolve_method: Option<DnsResolveMethodConfig>,

    /// The maximum time to wait to perform DNS queries [default: 5s]
    #[arg(long, value_parser = parse_duration)]
    pub dns_timeout: Option<Duration>,

    /// The time-to-live (TTL) of DNS entries [default: 300s]
    #[arg(long, value_parser = parse_duration)]
    pub dns_ttl: Option<Duration>,

    /// How long a finished run waits for pending hostname lookups [default: 1s]
    #[arg(long, value_parser = parse_duration)]
    pub dns_grace_duration: Option<Duration>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// The debug log format [default: pretty]
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: hopstat=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log span events [default: off]
    #[arg(long)]
    pub log_span_events: Option<LogSpanEvents>,
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}

fn parse_addr(value: &str) -> anyhow::Result<IpAddr> {
    Ok(IpAddr::from_str(value)?)
}
