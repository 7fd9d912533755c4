use crate::types::{MaxRounds, PacketSize, Sequence, TimeToLive, TraceId};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::time::Duration;

    /// The default value for `count`.
    pub const DEFAULT_COUNT: usize = 5;

    /// The default value for `timeout`.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(800);

    /// The default value for `interval`.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    /// The default value for `hop-sleep`.
    pub const DEFAULT_HOP_SLEEP: Duration = Duration::from_nanos(1);

    /// The default value for `max-hops`.
    pub const DEFAULT_MAX_HOPS: u8 = 64;

    /// The default value for `max-unknown-hops`.
    pub const DEFAULT_MAX_UNKNOWN_HOPS: u8 = 10;

    /// The default value for `ring-buffer-size`.
    pub const DEFAULT_RING_BUFFER_SIZE: usize = 50;

    /// The default value for `ptr-lookup`.
    pub const DEFAULT_PTR_LOOKUP: bool = false;

    /// The default value for `packet-size`.
    pub const DEFAULT_PACKET_SIZE: u16 = 84;

    /// The default value for `read-timeout`.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);

    /// The default value for `initial-sequence`.
    pub const DEFAULT_INITIAL_SEQUENCE: u16 = 33434;

    /// How long a finished run waits for outstanding reverse lookups.
    pub const DEFAULT_DNS_GRACE_DURATION: Duration = Duration::from_millis(1000);
}

/// The maximum ttl we allow.
pub const MAX_TTL: u8 = 254;

/// Configuration for a probe channel.
#[derive(Debug, Copy, Clone)]
pub struct ChannelConfig {
    pub source_addr: Ipv4Addr,
    pub target_addr: Ipv4Addr,
    pub packet_size: PacketSize,
    pub read_timeout: Duration,
}

/// Configuration for the round scheduler.
#[derive(Debug, Copy, Clone)]
pub struct StrategyConfig {
    pub target_addr: IpAddr,
    pub trace_identifier: TraceId,
    pub max_rounds: MaxRounds,
    pub timeout: Duration,
    pub interval: Duration,
    pub hop_sleep: Duration,
    pub max_hops: TimeToLive,
    pub max_unknown_hops: u8,
    pub initial_sequence: Sequence,
}

/// Configuration for the hop table.
#[derive(Debug, Copy, Clone)]
pub struct StateConfig {
    pub target_addr: IpAddr,
    pub max_hops: TimeToLive,
    pub ring_buffer_size: usize,
}

/// The validated settings of a tracer.
#[derive(Debug, Clone)]
pub(crate) struct TracerConfig {
    pub interface: Option<String>,
    pub source_addr: Option<Ipv4Addr>,
    pub target_addr: Ipv4Addr,
    pub packet_size: PacketSize,
    pub read_timeout: Duration,
    pub trace_identifier: TraceId,
    pub max_rounds: MaxRounds,
    pub timeout: Duration,
    pub interval: Duration,
    pub hop_sleep: Duration,
    pub max_hops: TimeToLive,
    pub max_unknown_hops: u8,
    pub initial_sequence: Sequence,
    pub ring_buffer_size: usize,
    pub reverse_lookup: bool,
    pub dns_config: hopstat_dns::Config,
    pub dns_grace_duration: Duration,
    pub drop_privileges: bool,
}

impl TracerConfig {
    pub const fn channel_config(&self, source_addr: Ipv4Addr) -> ChannelConfig {
        ChannelConfig {
            source_addr,
            target_addr: self.target_addr,
            packet_size: self.packet_size,
            read_timeout: self.read_timeout,
        }
    }

    pub const fn strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            target_addr: IpAddr::V4(self.target_addr),
            trace_identifier: self.trace_identifier,
            max_rounds: self.max_rounds,
            timeout: self.timeout,
            interval: self.interval,
            hop_sleep: self.hop_sleep,
            max_hops: self.max_hops,
            max_unknown_hops: self.max_unknown_hops,
            initial_sequence: self.initial_sequence,
        }
    }

    pub const fn state_config(&self) -> StateConfig {
        StateConfig {
            target_addr: IpAddr::V4(self.target_addr),
            max_hops: self.max_hops,
            ring_buffer_size: self.ring_buffer_size,
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            target_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            trace_identifier: TraceId::default(),
            max_rounds: MaxRounds(
                NonZeroUsize::new(defaults::DEFAULT_COUNT).unwrap_or(NonZeroUsize::MIN),
            ),
            timeout: defaults::DEFAULT_TIMEOUT,
            interval: defaults::DEFAULT_INTERVAL,
            hop_sleep: defaults::DEFAULT_HOP_SLEEP,
            max_hops: TimeToLive(defaults::DEFAULT_MAX_HOPS),
            max_unknown_hops: defaults::DEFAULT_MAX_UNKNOWN_HOPS,
            initial_sequence: Sequence(defaults::DEFAULT_INITIAL_SEQUENCE),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            target_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            max_hops: TimeToLive(defaults::DEFAULT_MAX_HOPS),
            ring_buffer_size: defaults::DEFAULT_RING_BUFFER_SIZE,
        }
    }
}
