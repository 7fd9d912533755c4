use crate::config::{defaults, TracerConfig, MAX_TTL};
use crate::error::{Error, Result};
use crate::net::channel::{MAX_PACKET_SIZE, MIN_PACKET_SIZE};
use crate::strategy::MAX_INITIAL_SEQUENCE;
use crate::types::{MaxRounds, PacketSize, Sequence, TimeToLive, TraceId};
use crate::Tracer;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Build a tracer.
///
/// The settings of a `Builder` make up the configuration of a single run.
/// They are validated once by [`Builder::build`] and never change
/// afterwards, so concurrent runs never share mutable settings.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use std::time::Duration;
/// use hopstat_core::Builder;
///
/// let addr = std::net::IpAddr::from([1, 2, 3, 4]);
/// let tracer = Builder::new(addr)
///     .count(10)
///     .timeout(Duration::from_millis(500))
///     .max_unknown_hops(5)
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Tracer`] - Probe the path to a target.
#[derive(Debug)]
pub struct Builder {
    interface: Option<String>,
    source_addr: Option<IpAddr>,
    target_addr: IpAddr,
    count: usize,
    timeout: Duration,
    interval: Duration,
    hop_sleep: Duration,
    max_hops: u8,
    max_unknown_hops: u8,
    ring_buffer_size: usize,
    reverse_lookup: bool,
    dns_config: hopstat_dns::Config,
    dns_grace_duration: Duration,
    packet_size: u16,
    read_timeout: Duration,
    trace_identifier: u16,
    initial_sequence: u16,
    drop_privileges: bool,
    cancel: Option<CancellationToken>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            interface: None,
            source_addr: None,
            target_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            count: defaults::DEFAULT_COUNT,
            timeout: defaults::DEFAULT_TIMEOUT,
            interval: defaults::DEFAULT_INTERVAL,
            hop_sleep: defaults::DEFAULT_HOP_SLEEP,
            max_hops: defaults::DEFAULT_MAX_HOPS,
            max_unknown_hops: defaults::DEFAULT_MAX_UNKNOWN_HOPS,
            ring_buffer_size: defaults::DEFAULT_RING_BUFFER_SIZE,
            reverse_lookup: defaults::DEFAULT_PTR_LOOKUP,
            dns_config: hopstat_dns::Config::default(),
            dns_grace_duration: defaults::DEFAULT_DNS_GRACE_DURATION,
            packet_size: defaults::DEFAULT_PACKET_SIZE,
            read_timeout: defaults::DEFAULT_READ_TIMEOUT,
            trace_identifier: 0,
            initial_sequence: defaults::DEFAULT_INITIAL_SEQUENCE,
            drop_privileges: false,
            cancel: None,
        }
    }
}

impl Builder {
    /// Build a tracer builder for a given target.
    ///
    /// The target must be an already resolved `IPv4` address.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use hopstat_core::Builder;
    ///
    /// let addr = std::net::IpAddr::from([1, 1, 1, 1]);
    /// let tracer = Builder::new(addr).build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn new(target_addr: IpAddr) -> Self {
        Self {
            target_addr,
            ..Default::default()
        }
    }

    /// Set the source address.
    ///
    /// If not set then the source address will be discovered based on the
    /// target address and the interface.
    #[must_use]
    pub fn source_addr(self, source_addr: Option<IpAddr>) -> Self {
        Self {
            source_addr,
            ..self
        }
    }

    /// Set the interface whose address is used as the source address.
    ///
    /// Ignored if a source address is set.
    #[must_use]
    pub fn interface<S: Into<String>>(self, interface: Option<S>) -> Self {
        Self {
            interface: interface.map(Into::into),
            ..self
        }
    }

    /// Set the number of rounds.
    ///
    /// Must be at least 1.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use hopstat_core::Builder;
    ///
    /// let addr = std::net::IpAddr::from([1, 1, 1, 1]);
    /// let tracer = Builder::new(addr).count(3).build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn count(self, count: usize) -> Self {
        Self { count, ..self }
    }

    /// Set how long to wait for a response to each probe.
    ///
    /// A response which arrives later counts the probe as lost.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Set the pause between rounds.
    #[must_use]
    pub fn interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    /// Set the pause between sending probes for successive hops of a round.
    #[must_use]
    pub fn hop_sleep(self, hop_sleep: Duration) -> Self {
        Self { hop_sleep, ..self }
    }

    /// Set the maximum number of hops to probe.
    ///
    /// Must be in the range `1..=254`.
    #[must_use]
    pub fn max_hops(self, max_hops: u8) -> Self {
        Self { max_hops, ..self }
    }

    /// Set the number of consecutive silent hops after which the run stops.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use hopstat_core::Builder;
    ///
    /// let addr = std::net::IpAddr::from([1, 1, 1, 1]);
    /// let tracer = Builder::new(addr).max_unknown_hops(3).build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn max_unknown_hops(self, max_unknown_hops: u8) -> Self {
        Self {
            max_unknown_hops,
            ..self
        }
    }

    /// Set the number of recent samples retained for each hop.
    ///
    /// Latency statistics are computed over the retained samples only.
    #[must_use]
    pub fn ring_buffer_size(self, ring_buffer_size: usize) -> Self {
        Self {
            ring_buffer_size,
            ..self
        }
    }

    /// Set whether hop addresses are resolved to hostnames.
    #[must_use]
    pub fn reverse_lookup(self, reverse_lookup: bool) -> Self {
        Self {
            reverse_lookup,
            ..self
        }
    }

    #[must_use]
    pub fn dns_config(self, dns_config: hopstat_dns::Config) -> Self {
        Self { dns_config, ..self }
    }

    /// Set how long a finished run waits for outstanding reverse lookups.
    #[must_use]
    pub fn dns_grace_duration(self, dns_grace_duration: Duration) -> Self {
        Self {
            dns_grace_duration,
            ..self
        }
    }

    /// Set the size of each probe `IPv4` packet, including headers.
    ///
    /// Must be in the range `28..=1024`.
    #[must_use]
    pub fn packet_size(self, packet_size: u16) -> Self {
        Self {
            packet_size,
            ..self
        }
    }

    /// Set the timeout of each socket read.
    ///
    /// This bounds how long the tracer may go without checking for
    /// cancellation.
    #[must_use]
    pub fn read_timeout(self, read_timeout: Duration) -> Self {
        Self {
            read_timeout,
            ..self
        }
    }

    /// Set the ICMP identifier carried by every probe.
    ///
    /// Responses with any other identifier are ignored, and so concurrent
    /// runs should each use a distinct value.
    #[must_use]
    pub fn trace_identifier(self, trace_id: u16) -> Self {
        Self {
            trace_identifier: trace_id,
            ..self
        }
    }

    #[must_use]
    pub fn initial_sequence(self, initial_sequence: u16) -> Self {
        Self {
            initial_sequence,
            ..self
        }
    }

    /// Drop privileges once the probe sockets are open.
    #[must_use]
    pub fn drop_privileges(self, drop_privileges: bool) -> Self {
        Self {
            drop_privileges,
            ..self
        }
    }

    /// Set the token used to cancel the run.
    ///
    /// A new token is created if none is given.  Cancelling the token stops
    /// the run, closes the probe sockets and cancels pending reverse
    /// lookups.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use hopstat_core::Builder;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// let cancel = CancellationToken::new();
    /// let addr = std::net::IpAddr::from([1, 1, 1, 1]);
    /// let tracer = Builder::new(addr)
    ///     .cancellation_token(cancel.clone())
    ///     .build()?;
    /// cancel.cancel();
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn cancellation_token(self, cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
            ..self
        }
    }

    /// Build the [`Tracer`].
    ///
    /// # Errors
    ///
    /// This function will return `Error::BadConfig` if the configuration is
    /// invalid and `Error::InvalidPacketSize` if the packet size is out of
    /// range.
    pub fn build(self) -> Result<Tracer> {
        let IpAddr::V4(target_addr) = self.target_addr else {
            return Err(Error::BadConfig(format!(
                "target address {} is not IPv4",
                self.target_addr
            )));
        };
        let source_addr = match self.source_addr {
            None => None,
            Some(IpAddr::V4(addr)) => Some(addr),
            Some(addr) => {
                return Err(Error::BadConfig(format!(
                    "source address {addr} is not IPv4"
                )));
            }
        };
        let Some(count) = NonZeroUsize::new(self.count) else {
            return Err(Error::BadConfig(String::from("count must be at least 1")));
        };
        if self.max_hops == 0 || self.max_hops > MAX_TTL {
            return Err(Error::BadConfig(format!(
                "max_hops {} not in range 1..={MAX_TTL}",
                self.max_hops
            )));
        }
        if self.ring_buffer_size == 0 {
            return Err(Error::BadConfig(String::from(
                "ring_buffer_size must be at least 1",
            )));
        }
        if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&usize::from(self.packet_size)) {
            return Err(Error::InvalidPacketSize(usize::from(self.packet_size)));
        }
        if self.initial_sequence > MAX_INITIAL_SEQUENCE {
            return Err(Error::BadConfig(format!(
                "initial_sequence {} > {MAX_INITIAL_SEQUENCE}",
                self.initial_sequence
            )));
        }
        let config = TracerConfig {
            interface: self.interface,
            source_addr,
            target_addr,
            packet_size: PacketSize(self.packet_size),
            read_timeout: self.read_timeout,
            trace_identifier: TraceId(self.trace_identifier),
            max_rounds: MaxRounds(count),
            timeout: self.timeout,
            interval: self.interval,
            hop_sleep: self.hop_sleep,
            max_hops: TimeToLive(self.max_hops),
            max_unknown_hops: self.max_unknown_hops,
            initial_sequence: Sequence(self.initial_sequence),
            ring_buffer_size: self.ring_buffer_size,
            reverse_lookup: self.reverse_lookup,
            dns_config: self.dns_config,
            dns_grace_duration: self.dns_grace_duration,
            drop_privileges: self.drop_privileges,
        };
        Ok(Tracer::new(config, self.cancel.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const TARGET_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(2, 2, 2, 2));

    #[test]
    fn test_builder_minimal() {
        let tracer = Builder::new(TARGET_ADDR).build().unwrap();
        assert_eq!(TARGET_ADDR, tracer.target_addr());
        assert_eq!(None, tracer.source_addr());
        assert_eq!(None, tracer.interface());
        assert_eq!(defaults::DEFAULT_COUNT, tracer.max_rounds().0.get());
        assert_eq!(defaults::DEFAULT_TIMEOUT, tracer.timeout());
        assert_eq!(defaults::DEFAULT_INTERVAL, tracer.interval());
        assert_eq!(defaults::DEFAULT_HOP_SLEEP, tracer.hop_sleep());
        assert_eq!(TimeToLive(defaults::DEFAULT_MAX_HOPS), tracer.max_hops());
        assert_eq!(
            defaults::DEFAULT_MAX_UNKNOWN_HOPS,
            tracer.max_unknown_hops()
        );
        assert_eq!(
            defaults::DEFAULT_RING_BUFFER_SIZE,
            tracer.ring_buffer_size()
        );
        assert_eq!(defaults::DEFAULT_PTR_LOOKUP, tracer.reverse_lookup());
        assert_eq!(defaults::DEFAULT_PACKET_SIZE, tracer.packet_size().0);
        assert_eq!(TraceId::default(), tracer.trace_identifier());
        assert!(!tracer.is_cancelled());
    }

    #[test]
    fn test_builder_full() {
        let cancel = CancellationToken::new();
        let tracer = Builder::new(TARGET_ADDR)
            .source_addr(Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))))
            .interface(Some("eth0"))
            .count(10)
            .timeout(Duration::from_millis(500))
            .interval(Duration::from_millis(50))
            .hop_sleep(Duration::from_millis(5))
            .max_hops(30)
            .max_unknown_hops(3)
            .ring_buffer_size(20)
            .reverse_lookup(true)
            .dns_grace_duration(Duration::from_millis(100))
            .packet_size(64)
            .read_timeout(Duration::from_millis(5))
            .trace_identifier(4321)
            .initial_sequence(1000)
            .drop_privileges(true)
            .cancellation_token(cancel.clone())
            .build()
            .unwrap();
        assert_eq!(Some("eth0"), tracer.interface());
        assert_eq!(10, tracer.max_rounds().0.get());
        assert_eq!(Duration::from_millis(500), tracer.timeout());
        assert_eq!(Duration::from_millis(50), tracer.interval());
        assert_eq!(Duration::from_millis(5), tracer.hop_sleep());
        assert_eq!(TimeToLive(30), tracer.max_hops());
        assert_eq!(3, tracer.max_unknown_hops());
        assert_eq!(20, tracer.ring_buffer_size());
        assert!(tracer.reverse_lookup());
        assert_eq!(PacketSize(64), tracer.packet_size());
        assert_eq!(TraceId(4321), tracer.trace_identifier());
        cancel.cancel();
        assert!(tracer.is_cancelled());
    }

    #[test]
    fn test_zero_count() {
        let err = Builder::new(TARGET_ADDR).count(0).build().unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }

    #[test_case(0; "zero")]
    #[test_case(255; "above max")]
    fn test_invalid_max_hops(max_hops: u8) {
        let err = Builder::new(TARGET_ADDR)
            .max_hops(max_hops)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }

    #[test]
    fn test_max_hops_bounds() {
        assert!(Builder::new(TARGET_ADDR).max_hops(1).build().is_ok());
        assert!(Builder::new(TARGET_ADDR).max_hops(MAX_TTL).build().is_ok());
    }

    #[test]
    fn test_zero_max_unknown_hops_allowed() {
        assert!(Builder::new(TARGET_ADDR).max_unknown_hops(0).build().is_ok());
    }

    #[test]
    fn test_zero_ring_buffer_size() {
        let err = Builder::new(TARGET_ADDR)
            .ring_buffer_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }

    #[test_case(27; "too small")]
    #[test_case(1025; "too large")]
    fn test_invalid_packet_size(packet_size: u16) {
        let err = Builder::new(TARGET_ADDR)
            .packet_size(packet_size)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPacketSize(size) if size == usize::from(packet_size)));
    }

    #[test]
    fn test_ipv6_target() {
        let target = IpAddr::V6(std::net::Ipv6Addr::LOCALHOST);
        let err = Builder::new(target).build().unwrap_err();
        assert_eq!(
            "invalid config: target address ::1 is not IPv4",
            err.to_string()
        );
    }

    #[test]
    fn test_ipv6_source() {
        let source = IpAddr::V6(std::net::Ipv6Addr::LOCALHOST);
        let err = Builder::new(TARGET_ADDR)
            .source_addr(Some(source))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }

    #[test]
    fn test_invalid_initial_sequence() {
        let err = Builder::new(TARGET_ADDR)
            .initial_sequence(u16::MAX)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }
}
