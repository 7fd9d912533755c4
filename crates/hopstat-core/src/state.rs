use crate::aggregate::{aggregate, HopStats};
use crate::completion::RunOutcome;
use crate::config::StateConfig;
use crate::probe::ProbeStatus;
use crate::ring::{RingBuffer, Sample};
use crate::strategy::Round;
use crate::types::TimeToLive;
use std::net::IpAddr;
use std::time::Duration;
use tracing::instrument;

/// The hop table of a run.
///
/// Holds one `Hop` for every ttl from 1 to the maximum hops, indexed by
/// `ttl - 1`.  Hops are created up front and only ever mutated.
#[derive(Debug, Clone)]
pub struct State {
    config: StateConfig,
    hops: Vec<Hop>,
    round_count: usize,
    outcome: Option<RunOutcome>,
    error: Option<String>,
}

impl State {
    /// Create a new `State`.
    #[must_use]
    pub fn new(config: StateConfig) -> Self {
        let hops = (1..=config.max_hops.0)
            .map(|ttl| Hop::new(TimeToLive(ttl), config.ring_buffer_size))
            .collect();
        Self {
            config,
            hops,
            round_count: 0,
            outcome: None,
            error: None,
        }
    }

    /// Every hop in the table, including those never probed.
    #[must_use]
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// The hop for a given ttl, if within range.
    #[must_use]
    pub fn hop(&self, ttl: TimeToLive) -> Option<&Hop> {
        usize::from(ttl)
            .checked_sub(1)
            .and_then(|index| self.hops.get(index))
    }

    #[must_use]
    pub const fn target_addr(&self) -> IpAddr {
        self.config.target_addr
    }

    /// The number of completed rounds.
    #[must_use]
    pub const fn round_count(&self) -> usize {
        self.round_count
    }

    /// The lowest ttl whose hop last replied from the target address.
    #[must_use]
    pub fn reached_ttl(&self) -> Option<TimeToLive> {
        self.hops
            .iter()
            .find(|hop| hop.addr == Some(self.config.target_addr))
            .map(|hop| hop.ttl)
    }

    /// The highest ttl for which a probe has been sent.
    #[must_use]
    pub fn highest_probed_ttl(&self) -> Option<TimeToLive> {
        self.hops
            .iter()
            .rev()
            .find(|hop| hop.sent > 0)
            .map(|hop| hop.ttl)
    }

    /// The hops to report: up to the reached hop if any, otherwise up to the
    /// highest probed hop.
    #[must_use]
    pub fn reported_hops(&self) -> &[Hop] {
        let end = self
            .reached_ttl()
            .or_else(|| self.highest_probed_ttl())
            .map_or(0, usize::from);
        &self.hops[..end]
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn set_outcome(&mut self, outcome: RunOutcome) {
        self.outcome = Some(outcome);
    }

    /// The error message for the run, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Record the hostname of every hop currently at `addr`.
    #[instrument(skip(self), level = "trace")]
    pub fn set_hostname(&mut self, addr: IpAddr, hostname: &str) {
        for hop in self.hops.iter_mut().filter(|hop| hop.addr == Some(addr)) {
            hop.hostname = Some(hostname.to_string());
        }
    }

    /// Update the table from a completed `Round`.
    ///
    /// Each probe at or below the largest ttl of the round counts as one
    /// probe sent for its hop.  Probes which are still awaited or which
    /// failed to send are counted as lost.
    #[instrument(skip(self, round), level = "trace")]
    pub fn update_from_round(&mut self, round: &Round<'_>) {
        for probe in round.probes {
            match probe {
                ProbeStatus::Awaited(awaited) | ProbeStatus::Failed(awaited)
                    if awaited.ttl <= round.largest_ttl =>
                {
                    if let Some(hop) = self.hop_mut(awaited.ttl) {
                        hop.sent += 1;
                        hop.lost += 1;
                        hop.ring.push(Sample::lost(awaited.sequence));
                    }
                }
                ProbeStatus::Complete(complete) if complete.ttl <= round.largest_ttl => {
                    let is_target = complete.host == self.config.target_addr;
                    if let Some(hop) = self.hop_mut(complete.ttl) {
                        hop.sent += 1;
                        if hop.addr != Some(complete.host) {
                            hop.hostname = None;
                        }
                        hop.addr = Some(complete.host);
                        hop.status = if is_target {
                            HopStatus::DestinationReached
                        } else {
                            HopStatus::Responding
                        };
                        hop.ring
                            .push(Sample::reply(complete.sequence, complete.rtt()));
                    }
                }
                _ => {}
            }
        }
        self.round_count += 1;
    }

    fn hop_mut(&mut self, ttl: TimeToLive) -> Option<&mut Hop> {
        usize::from(ttl)
            .checked_sub(1)
            .and_then(|index| self.hops.get_mut(index))
    }

    /// Take a snapshot of the run suitable for reporting.
    #[must_use]
    pub fn result(&self) -> RunResult {
        RunResult {
            target_addr: self.config.target_addr,
            outcome: self.outcome,
            rounds: self.round_count,
            hops: self.reported_hops().iter().map(HopResult::from).collect(),
        }
    }
}

/// The status of a hop.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum HopStatus {
    /// No reply has been received.
    #[default]
    Unknown,
    /// The most recent reply came from an intermediate router.
    Responding,
    /// The most recent reply came from the target.
    DestinationReached,
}

/// Information about a single `Hop` within a run.
#[derive(Debug, Clone)]
pub struct Hop {
    ttl: TimeToLive,
    addr: Option<IpAddr>,
    hostname: Option<String>,
    sent: usize,
    lost: usize,
    status: HopStatus,
    ring: RingBuffer,
}

impl Hop {
    fn new(ttl: TimeToLive, capacity: usize) -> Self {
        Self {
            ttl,
            addr: None,
            hostname: None,
            sent: 0,
            lost: 0,
            status: HopStatus::Unknown,
            ring: RingBuffer::new(capacity),
        }
    }

    /// The ttl of this hop.
    #[must_use]
    pub const fn ttl(&self) -> TimeToLive {
        self.ttl
    }

    /// The address which most recently replied for this hop.
    #[must_use]
    pub const fn addr(&self) -> Option<IpAddr> {
        self.addr
    }

    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// The total probes sent for this hop.
    #[must_use]
    pub const fn sent(&self) -> usize {
        self.sent
    }

    /// The total probes lost for this hop.
    #[must_use]
    pub const fn lost(&self) -> usize {
        self.lost
    }

    #[must_use]
    pub const fn status(&self) -> HopStatus {
        self.status
    }

    /// The recent sample history of this hop.
    #[must_use]
    pub const fn samples(&self) -> &RingBuffer {
        &self.ring
    }

    /// Loss and latency statistics, computed fresh on each call.
    #[must_use]
    pub fn stats(&self) -> HopStats {
        aggregate(&self.ring, self.sent, self.lost)
    }
}

/// A read-only snapshot of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub target_addr: IpAddr,
    /// How the run ended, `None` if it is still running.
    pub outcome: Option<RunOutcome>,
    /// The number of completed rounds.
    pub rounds: usize,
    /// The reported hops in ttl order.
    pub hops: Vec<HopResult>,
}

/// A read-only snapshot of a hop.
#[derive(Debug, Clone, PartialEq)]
pub struct HopResult {
    pub ttl: u8,
    pub addr: Option<IpAddr>,
    pub hostname: Option<String>,
    pub status: HopStatus,
    pub sent: usize,
    pub lost: usize,
    pub loss_pct: f64,
    pub last: Option<Duration>,
    pub avg: Option<Duration>,
    pub best: Option<Duration>,
    pub worst: Option<Duration>,
}

impl From<&Hop> for HopResult {
    fn from(hop: &Hop) -> Self {
        let stats = hop.stats();
        Self {
            ttl: hop.ttl.0,
            addr: hop.addr,
            hostname: hop.hostname.clone(),
            status: hop.status,
            sent: hop.sent,
            lost: hop.lost,
            loss_pct: stats.loss_pct,
            last: stats.last,
            avg: stats.avg,
            best: stats.best,
            worst: stats.worst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{IcmpPacketType, Probe};
    use crate::types::{RoundId, Sequence, TraceId};
    use std::net::Ipv4Addr;
    use std::time::SystemTime;

    const TARGET: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9));

    fn state(max_hops: u8, ring_buffer_size: usize) -> State {
        State::new(StateConfig {
            target_addr: TARGET,
            max_hops: TimeToLive(max_hops),
            ring_buffer_size,
        })
    }

    fn probe(ttl: u8, sent: SystemTime) -> Probe {
        Probe::new(
            Sequence(33433 + u16::from(ttl)),
            TraceId(1),
            TimeToLive(ttl),
            RoundId(0),
            sent,
        )
    }

    fn complete(ttl: u8, host: IpAddr, rtt_ms: u64) -> ProbeStatus {
        let sent = SystemTime::now();
        ProbeStatus::Complete(probe(ttl, sent).complete(
            host,
            sent + Duration::from_millis(rtt_ms),
            IcmpPacketType::TimeExceeded,
        ))
    }

    fn awaited(ttl: u8) -> ProbeStatus {
        ProbeStatus::Awaited(probe(ttl, SystemTime::now()))
    }

    fn router(last_octet: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet))
    }

    #[test]
    fn test_new_is_dense() {
        let state = state(5, 10);
        assert_eq!(5, state.hops().len());
        for (i, hop) in state.hops().iter().enumerate() {
            assert_eq!(TimeToLive(i as u8 + 1), hop.ttl());
            assert_eq!(HopStatus::Unknown, hop.status());
            assert_eq!(0, hop.sent());
        }
        assert!(state.reported_hops().is_empty());
    }

    #[test]
    fn test_update_from_round() {
        let mut state = state(10, 10);
        let probes = [
            complete(1, router(1), 3),
            awaited(2),
            complete(3, TARGET, 12),
        ];
        state.update_from_round(&Round::new(&probes, RoundId(0), TimeToLive(3)));
        assert_eq!(1, state.round_count());
        let hop1 = state.hop(TimeToLive(1)).unwrap();
        assert_eq!(Some(router(1)), hop1.addr());
        assert_eq!(HopStatus::Responding, hop1.status());
        assert_eq!((1, 0), (hop1.sent(), hop1.lost()));
        let hop2 = state.hop(TimeToLive(2)).unwrap();
        assert_eq!(None, hop2.addr());
        assert_eq!((1, 1), (hop2.sent(), hop2.lost()));
        let hop3 = state.hop(TimeToLive(3)).unwrap();
        assert_eq!(HopStatus::DestinationReached, hop3.status());
        assert_eq!(Some(Duration::from_millis(12)), hop3.stats().last);
        assert_eq!(Some(TimeToLive(3)), state.reached_ttl());
        assert_eq!(3, state.reported_hops().len());
    }

    #[test]
    fn test_probes_beyond_largest_ttl_ignored() {
        let mut state = state(10, 10);
        let probes = [
            complete(1, TARGET, 3),
            complete(2, TARGET, 3),
            awaited(3),
        ];
        state.update_from_round(&Round::new(&probes, RoundId(0), TimeToLive(1)));
        assert_eq!(1, state.hop(TimeToLive(1)).unwrap().sent());
        assert_eq!(0, state.hop(TimeToLive(2)).unwrap().sent());
        assert_eq!(0, state.hop(TimeToLive(3)).unwrap().sent());
        assert_eq!(1, state.reported_hops().len());
    }

    #[test]
    fn test_failed_counts_as_lost() {
        let mut state = state(3, 10);
        let probes = [ProbeStatus::Failed(probe(1, SystemTime::now()))];
        state.update_from_round(&Round::new(&probes, RoundId(0), TimeToLive(1)));
        let hop = state.hop(TimeToLive(1)).unwrap();
        assert_eq!((1, 1), (hop.sent(), hop.lost()));
        assert!((hop.stats().loss_pct - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counters_outlive_ring() {
        let mut state = state(1, 2);
        for round in 0..5 {
            let probes = [if round % 2 == 0 {
                awaited(1)
            } else {
                complete(1, router(1), 5)
            }];
            state.update_from_round(&Round::new(&probes, RoundId(round), TimeToLive(1)));
        }
        let hop = state.hop(TimeToLive(1)).unwrap();
        assert_eq!(5, hop.sent());
        assert_eq!(3, hop.lost());
        assert_eq!(2, hop.samples().len());
        assert!(hop.lost() <= hop.sent());
    }

    #[test]
    fn test_set_hostname() {
        let mut state = state(3, 10);
        let probes = [complete(1, router(1), 1), complete(2, router(2), 1)];
        state.update_from_round(&Round::new(&probes, RoundId(0), TimeToLive(2)));
        state.set_hostname(router(2), "core.example.net");
        assert_eq!(None, state.hop(TimeToLive(1)).unwrap().hostname());
        assert_eq!(
            Some("core.example.net"),
            state.hop(TimeToLive(2)).unwrap().hostname()
        );
    }

    #[test]
    fn test_addr_change_clears_hostname() {
        let mut state = state(1, 10);
        let probes = [complete(1, router(1), 1)];
        state.update_from_round(&Round::new(&probes, RoundId(0), TimeToLive(1)));
        state.set_hostname(router(1), "a.example.net");
        let probes = [complete(1, router(2), 1)];
        state.update_from_round(&Round::new(&probes, RoundId(1), TimeToLive(1)));
        let hop = state.hop(TimeToLive(1)).unwrap();
        assert_eq!(Some(router(2)), hop.addr());
        assert_eq!(None, hop.hostname());
    }

    #[test]
    fn test_result_is_snapshot() {
        let mut state = state(4, 10);
        let probes = [complete(1, router(1), 4), awaited(2)];
        state.update_from_round(&Round::new(&probes, RoundId(0), TimeToLive(2)));
        state.set_outcome(RunOutcome::RoundsExhausted);
        let result = state.result();
        state.update_from_round(&Round::new(&probes, RoundId(1), TimeToLive(2)));
        assert_eq!(Some(RunOutcome::RoundsExhausted), result.outcome);
        assert_eq!(1, result.rounds);
        assert_eq!(2, result.hops.len());
        assert_eq!(1, result.hops[0].sent);
        assert_eq!(Some(Duration::from_millis(4)), result.hops[0].avg);
        assert_eq!(None, result.hops[1].avg);
        assert!((result.hops[1].loss_pct - 100.0).abs() < f64::EPSILON);
    }
}
