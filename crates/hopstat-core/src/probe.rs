use crate::types::{RoundId, Sequence, TimeToLive, TraceId};
use std::net::IpAddr;
use std::time::{Duration, SystemTime};

/// The state of a probe slot within a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The probe has not been sent.
    #[default]
    NotSent,
    /// The probe has been sent and we are awaiting the response.
    Awaited(Probe),
    /// The probe has been sent and a response has been received.
    Complete(ProbeComplete),
    /// The probe could not be sent.
    ///
    /// Counted as lost for the hop it was meant for.
    Failed(Probe),
}

/// An ICMP echo request sent with a given ttl.
///
/// # Examples
///
/// ```
/// use hopstat_core::{Probe, RoundId, Sequence, TimeToLive, TraceId};
/// use std::time::SystemTime;
///
/// let probe = Probe::new(
///     Sequence(33434),
///     TraceId(1234),
///     TimeToLive(1),
///     RoundId(0),
///     SystemTime::now(),
/// );
/// assert_eq!(TimeToLive(1), probe.ttl);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// The sequence of the probe.
    pub sequence: Sequence,
    /// The trace identifier.
    pub identifier: TraceId,
    /// The TTL of the probe.
    pub ttl: TimeToLive,
    /// Which round the probe belongs to.
    pub round: RoundId,
    /// Timestamp when the probe was sent.
    pub sent: SystemTime,
}

impl Probe {
    #[must_use]
    pub const fn new(
        sequence: Sequence,
        identifier: TraceId,
        ttl: TimeToLive,
        round: RoundId,
        sent: SystemTime,
    ) -> Self {
        Self {
            sequence,
            identifier,
            ttl,
            round,
            sent,
        }
    }

    /// A response has been received and the probe is now complete.
    #[must_use]
    pub const fn complete(
        self,
        host: IpAddr,
        received: SystemTime,
        icmp_packet_type: IcmpPacketType,
    ) -> ProbeComplete {
        ProbeComplete {
            sequence: self.sequence,
            identifier: self.identifier,
            ttl: self.ttl,
            round: self.round,
            sent: self.sent,
            host,
            received,
            icmp_packet_type,
        }
    }
}

/// A probe for which a response has been received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeComplete {
    /// The sequence of the probe.
    pub sequence: Sequence,
    /// The trace identifier.
    pub identifier: TraceId,
    /// The TTL of the probe.
    pub ttl: TimeToLive,
    /// Which round the probe belongs to.
    pub round: RoundId,
    /// Timestamp when the probe was sent.
    pub sent: SystemTime,
    /// The host which responded to the probe.
    pub host: IpAddr,
    /// Timestamp when the response to the probe was received.
    pub received: SystemTime,
    /// The type of ICMP response packet received for the probe.
    pub icmp_packet_type: IcmpPacketType,
}

impl ProbeComplete {
    /// The round trip time of the probe.
    ///
    /// A clock which steps backwards yields zero.
    #[must_use]
    pub fn rtt(&self) -> Duration {
        self.received.duration_since(self.sent).unwrap_or_default()
    }
}

/// The type of ICMP packet received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpPacketType {
    /// `TimeExceeded` packet.
    TimeExceeded,
    /// `EchoReply` packet.
    EchoReply,
}

/// The response to a probe.
#[derive(Debug, Clone)]
pub enum Response {
    TimeExceeded(ResponseData),
    EchoReply(ResponseData),
}

impl Response {
    #[must_use]
    pub const fn data(&self) -> &ResponseData {
        match self {
            Self::TimeExceeded(data) | Self::EchoReply(data) => data,
        }
    }

    #[must_use]
    pub const fn icmp_packet_type(&self) -> IcmpPacketType {
        match self {
            Self::TimeExceeded(_) => IcmpPacketType::TimeExceeded,
            Self::EchoReply(_) => IcmpPacketType::EchoReply,
        }
    }
}

/// The data in the probe response.
#[derive(Debug, Clone)]
pub struct ResponseData {
    /// Timestamp of the probe response.
    pub recv: SystemTime,
    /// The `IpAddr` that responded to the probe.
    pub addr: IpAddr,
    /// The ICMP identifier of the echo request being answered.
    pub identifier: u16,
    /// The ICMP sequence number of the echo request being answered.
    pub sequence: u16,
}

impl ResponseData {
    pub const fn new(recv: SystemTime, addr: IpAddr, identifier: u16, sequence: u16) -> Self {
        Self {
            recv,
            addr,
            identifier,
            sequence,
        }
    }
}

#[cfg(test)]
impl ProbeStatus {
    #[must_use]
    pub fn try_into_awaited(self) -> Option<Probe> {
        if let Self::Awaited(awaited) = self {
            Some(awaited)
        } else {
            None
        }
    }

    #[must_use]
    pub fn try_into_complete(self) -> Option<ProbeComplete> {
        if let Self::Complete(complete) = self {
            Some(complete)
        } else {
            None
        }
    }
}
