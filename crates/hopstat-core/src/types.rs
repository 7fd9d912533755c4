use derive_more::{Add, AddAssign, Sub};
use std::num::NonZeroUsize;

/// `RoundId` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, AddAssign)]
pub struct RoundId(pub usize);

/// `MaxRounds` newtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd)]
pub struct MaxRounds(pub NonZeroUsize);

/// `TimeToLive` (ttl) newtype.
///
/// The ttl of a probe is also the 1-based index of the hop it measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Add, Sub, AddAssign)]
pub struct TimeToLive(pub u8);

/// `Sequence` number newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Add, Sub, AddAssign)]
pub struct Sequence(pub u16);

/// `TraceId` newtype.
///
/// Carried as the ICMP echo identifier to tell our probes apart from those
/// of other processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct TraceId(pub u16);

/// `PacketSize` newtype.
///
/// The size of the whole `IPv4` packet, including headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct PacketSize(pub u16);

impl From<Sequence> for usize {
    fn from(sequence: Sequence) -> Self {
        sequence.0 as Self
    }
}

impl From<TimeToLive> for usize {
    fn from(ttl: TimeToLive) -> Self {
        ttl.0 as Self
    }
}
