use self::state::TracerState;
use crate::completion::{Completion, CompletionDetector, RunOutcome};
use crate::config::StrategyConfig;
use crate::error::{Error, Result};
use crate::net::Network;
use crate::probe::{IcmpPacketType, Probe, ProbeStatus, Response};
use crate::state::State;
use crate::types::{RoundId, Sequence, TimeToLive, TraceId};
use parking_lot::RwLock;
use std::net::IpAddr;
use std::time::{Instant, SystemTime};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

pub(crate) use self::state::MAX_INITIAL_SEQUENCE;

/// The output from a round of tracing.
#[derive(Debug, Clone)]
pub struct Round<'a> {
    /// The state of all `ProbeStatus` that were sent in the round.
    pub probes: &'a [ProbeStatus],
    /// The round these probes belong to.
    pub round: RoundId,
    /// The largest time-to-live (ttl) which is accounted for in the round.
    ///
    /// This is the ttl of the target if it replied in the round, otherwise
    /// the largest ttl sent.
    pub largest_ttl: TimeToLive,
}

impl<'a> Round<'a> {
    #[must_use]
    pub const fn new(probes: &'a [ProbeStatus], round: RoundId, largest_ttl: TimeToLive) -> Self {
        Self {
            probes,
            round,
            largest_ttl,
        }
    }
}

/// Probe the path to a target in rounds.
#[derive(Debug, Clone)]
pub struct Strategy<F> {
    config: StrategyConfig,
    cancel: CancellationToken,
    publish: F,
}

impl<F: Fn(&Round<'_>)> Strategy<F> {
    #[instrument(skip_all, level = "trace")]
    pub fn new(config: &StrategyConfig, cancel: CancellationToken, publish: F) -> Self {
        tracing::debug!(?config);
        Self {
            config: *config,
            cancel,
            publish,
        }
    }

    /// Run rounds until the run completes or is cancelled.
    ///
    /// The hop `table` is updated at the end of every round, after which the
    /// round is passed to the publish hook.  The `network` is dropped, and so
    /// its sockets closed, before this returns.
    #[instrument(skip(self, network, table), level = "trace")]
    pub fn run<N: Network>(self, mut network: N, table: &RwLock<State>) -> Result<RunOutcome> {
        let detector = CompletionDetector::new(
            self.config.max_rounds,
            self.config.max_hops,
            self.config.max_unknown_hops,
        );
        let mut state = TracerState::new(self.config);
        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!("run cancelled");
                return Ok(RunOutcome::Cancelled);
            }
            self.send_request(&mut network, &mut state)?;
            self.recv_response(&mut network, &mut state)?;
            if let Some(outcome) = self.update_round(&mut network, &mut state, table, &detector)? {
                return Ok(outcome);
            }
        }
    }

    /// Send the next probe if required.
    ///
    /// Send a probe for the next time-to-live (ttl) if all the following are true:
    ///
    /// 1 - the target host has not been found in this round
    /// 2 - the next ttl is not greater than the maximum allowed ttl
    /// 3 - if the ttl of the target is known:
    ///       - the next ttl is not greater than the ttl of the target
    ///     otherwise:
    ///       - the next ttl is no more than `max_unknown_hops + 1` beyond the
    ///         largest ttl which has answered in this round
    /// 4 - at least `hop_sleep` has passed since the previous probe was sent
    fn send_request<N: Network>(&self, network: &mut N, st: &mut TracerState) -> Result<()> {
        let now = SystemTime::now();
        if st.can_send() && st.hop_sleep_elapsed(now) {
            let probe = st.next_probe(now);
            Self::do_send(network, st, probe)?;
        }
        Ok(())
    }

    /// Send the probe and handle errors.
    ///
    /// A probe which the kernel refuses to route is marked as failed, and
    /// later counted as lost, rather than ending the run.
    #[instrument(skip(network, st), level = "trace")]
    fn do_send<N: Network>(network: &mut N, st: &mut TracerState, probe: Probe) -> Result<()> {
        match network.send_probe(probe) {
            Ok(()) => Ok(()),
            Err(Error::ProbeFailed(err)) => {
                tracing::debug!(%err, "probe failed");
                st.fail_probe();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Read and process the next incoming `ICMP` packet.
    ///
    /// Responses may arrive in any order.  Each probe of the round is held in
    /// a buffer indexed by the offset of its sequence number from the first
    /// sequence number of the round, and the sequence number and identifier
    /// are echoed back in both `TimeExceeded` and `EchoReply` responses.
    ///
    /// Responses carrying another identifier belong to some other process and
    /// are ignored, as are responses for a prior round.
    fn recv_response<N: Network>(&self, network: &mut N, st: &mut TracerState) -> Result<()> {
        let next = network.recv_probe()?;
        if let Some(resp) = next {
            let resp = StrategyResponse::from((resp, &self.config));
            if self.check_trace_id(resp.trace_id) && st.in_round(resp.sequence) {
                st.complete_probe(resp);
            }
        }
        Ok(())
    }

    /// Check if the round is complete and, if so, account for it.
    ///
    /// A round is complete once no further probe may be sent and every
    /// probe still awaited has exceeded the timeout.
    ///
    /// Returns the outcome of the run if it is finished.
    fn update_round<N: Network>(
        &self,
        network: &mut N,
        st: &mut TracerState,
        table: &RwLock<State>,
        detector: &CompletionDetector,
    ) -> Result<Option<RunOutcome>> {
        let now = SystemTime::now();
        if st.can_send() || st.awaiting(now) {
            return Ok(None);
        }
        let round = Round::new(st.probes(), st.round(), st.largest_ttl());
        table.write().update_from_round(&round);
        (self.publish)(&round);
        if let Completion::Finished(outcome) = detector.evaluate(&table.read()) {
            return Ok(Some(outcome));
        }
        if self.wait_interval(network)? {
            tracing::debug!("run cancelled between rounds");
            return Ok(Some(RunOutcome::Cancelled));
        }
        st.advance_round();
        Ok(None)
    }

    /// Wait for the interval between rounds.
    ///
    /// Responses which arrive while waiting are late and are discarded.
    ///
    /// Returns true if the run was cancelled while waiting.
    fn wait_interval<N: Network>(&self, network: &mut N) -> Result<bool> {
        let start = Instant::now();
        while start.elapsed() < self.config.interval {
            if self.cancel.is_cancelled() {
                return Ok(true);
            }
            network.recv_probe()?;
        }
        Ok(self.cancel.is_cancelled())
    }

    /// Check if the `TraceId` matches the expected value for this tracer.
    #[instrument(skip(self), level = "trace")]
    fn check_trace_id(&self, trace_id: TraceId) -> bool {
        self.config.trace_identifier == trace_id
    }
}

/// Derived response based on strategy config.
#[derive(Debug)]
struct StrategyResponse {
    icmp_packet_type: IcmpPacketType,
    trace_id: TraceId,
    sequence: Sequence,
    received: SystemTime,
    addr: IpAddr,
    is_target: bool,
}

impl From<(Response, &StrategyConfig)> for StrategyResponse {
    fn from((resp, config): (Response, &StrategyConfig)) -> Self {
        let icmp_packet_type = resp.icmp_packet_type();
        let data = resp.data();
        Self {
            icmp_packet_type,
            trace_id: TraceId(data.identifier),
            sequence: Sequence(data.sequence),
            received: data.recv,
            addr: data.addr,
            is_target: data.addr == config.target_addr,
        }
    }
}

/// Mutable state needed for the tracing algorithm.
///
/// This is contained within a submodule to ensure that mutations are only
/// performed via methods on the `TracerState` struct.
mod state {
    use crate::probe::{Probe, ProbeStatus};
    use crate::strategy::{StrategyConfig, StrategyResponse};
    use crate::types::{RoundId, Sequence, TimeToLive};
    use std::array::from_fn;
    use std::time::SystemTime;
    use tracing::instrument;

    /// The maximum number of `ProbeStatus` entries in the buffer.
    ///
    /// This is larger than the number of distinct ttl values a round can send.
    const BUFFER_SIZE: u16 = 256;

    /// The maximum sequence number at the start of a round.
    ///
    /// The sequence number is only ever wrapped between rounds, and so there
    /// must be enough sequence numbers left for a complete round.
    const MAX_SEQUENCE: Sequence = Sequence(u16::MAX - BUFFER_SIZE);

    /// The largest allowed initial sequence number.
    pub const MAX_INITIAL_SEQUENCE: u16 = MAX_SEQUENCE.0 - 1;

    #[derive(Debug)]
    pub struct TracerState {
        /// Tracer configuration.
        config: StrategyConfig,
        /// The state of all `ProbeStatus` requests and responses.
        buffer: [ProbeStatus; BUFFER_SIZE as usize],
        /// An increasing sequence number for every `EchoRequest`.
        sequence: Sequence,
        /// The starting sequence number of the current round.
        round_sequence: Sequence,
        /// The time-to-live for the _next_ `EchoRequest` packet to be sent.
        ttl: TimeToLive,
        /// The current round.
        round: RoundId,
        /// Did we receive an `EchoReply` from the target host in this round?
        target_found: bool,
        /// The maximum time-to-live echo response packet we have received in this round.
        max_received_ttl: Option<TimeToLive>,
        /// The observed time-to-live of the `EchoReply` from the target host.
        ///
        /// This is _not_ reset each round and can change over time, including
        /// going down as responses can be received out-of-order.
        target_ttl: Option<TimeToLive>,
        /// When the previous probe was sent.
        last_sent: Option<SystemTime>,
    }

    impl TracerState {
        pub fn new(config: StrategyConfig) -> Self {
            Self {
                config,
                buffer: from_fn(|_| ProbeStatus::default()),
                sequence: config.initial_sequence,
                round_sequence: config.initial_sequence,
                ttl: TimeToLive(1),
                round: RoundId(0),
                target_found: false,
                max_received_ttl: None,
                target_ttl: None,
                last_sent: None,
            }
        }

        /// Get a slice of `ProbeStatus` for the current round.
        pub fn probes(&self) -> &[ProbeStatus] {
            let round_size = self.sequence - self.round_sequence;
            &self.buffer[..usize::from(round_size)]
        }

        /// Get the `ProbeStatus` for `sequence`.
        pub fn probe_at(&self, sequence: Sequence) -> ProbeStatus {
            self.buffer[usize::from(sequence - self.round_sequence)].clone()
        }

        #[cfg(test)]
        pub const fn ttl(&self) -> TimeToLive {
            self.ttl
        }

        pub const fn round(&self) -> RoundId {
            self.round
        }

        #[cfg(test)]
        pub const fn target_found(&self) -> bool {
            self.target_found
        }

        #[cfg(test)]
        pub const fn max_received_ttl(&self) -> Option<TimeToLive> {
            self.max_received_ttl
        }

        #[cfg(test)]
        pub const fn target_ttl(&self) -> Option<TimeToLive> {
            self.target_ttl
        }

        /// The largest ttl accounted for in the current round.
        pub fn largest_ttl(&self) -> TimeToLive {
            match self.target_ttl {
                Some(target_ttl) if self.target_found => target_ttl,
                _ => self.ttl - TimeToLive(1),
            }
        }

        /// Is `sequence` a probe which has been sent in the current round?
        pub fn in_round(&self, sequence: Sequence) -> bool {
            sequence >= self.round_sequence && sequence < self.sequence
        }

        /// May another probe be sent in the current round?
        pub fn can_send(&self) -> bool {
            let within_horizon = match self.target_ttl {
                Some(target_ttl) => self.ttl <= target_ttl,
                None => {
                    let horizon = usize::from(self.max_received_ttl.unwrap_or_default())
                        + usize::from(self.config.max_unknown_hops)
                        + 1;
                    usize::from(self.ttl) <= horizon
                }
            };
            !self.target_found && self.ttl <= self.config.max_hops && within_horizon
        }

        /// Has `hop_sleep` passed since the previous probe was sent?
        pub fn hop_sleep_elapsed(&self, now: SystemTime) -> bool {
            match self.last_sent {
                None => true,
                Some(last_sent) => {
                    now.duration_since(last_sent).unwrap_or_default() >= self.config.hop_sleep
                }
            }
        }

        /// Is any probe which still counts for this round within its timeout?
        ///
        /// Once the target has replied, probes sent beyond it are not waited for.
        pub fn awaiting(&self, now: SystemTime) -> bool {
            let largest_ttl = self.largest_ttl();
            self.probes().iter().any(|probe| match probe {
                ProbeStatus::Awaited(awaited) => {
                    awaited.ttl <= largest_ttl
                        && now.duration_since(awaited.sent).unwrap_or_default()
                            <= self.config.timeout
                }
                _ => false,
            })
        }

        /// Create and return the next `Probe` at the current `sequence` and `ttl`.
        ///
        /// The `ttl` is post-incremented and so is never greater than
        /// `max_hops + 1`.
        #[instrument(skip(self), level = "trace")]
        pub fn next_probe(&mut self, sent: SystemTime) -> Probe {
            let probe = Probe::new(
                self.sequence,
                self.config.trace_identifier,
                self.ttl,
                self.round,
                sent,
            );
            let probe_index = usize::from(self.sequence - self.round_sequence);
            self.buffer[probe_index] = ProbeStatus::Awaited(probe.clone());
            debug_assert!(self.ttl < TimeToLive(u8::MAX));
            self.ttl += TimeToLive(1);
            debug_assert!(self.sequence < Sequence(u16::MAX));
            self.sequence += Sequence(1);
            self.last_sent = Some(sent);
            probe
        }

        /// Mark the most recently sent `ProbeStatus` as failed.
        #[instrument(skip(self), level = "trace")]
        pub fn fail_probe(&mut self) {
            let probe_index = usize::from(self.sequence - self.round_sequence) - 1;
            let probe = self.buffer[probe_index].clone();
            if let ProbeStatus::Awaited(awaited) = probe {
                self.buffer[probe_index] = ProbeStatus::Failed(awaited);
            }
        }

        /// Update the state of a `ProbeStatus` and the trace.
        ///
        /// We want to update:
        ///
        /// - the `target_ttl` to be the time-to-live of the probe answered by the target
        /// - the `max_received_ttl` we have observed this round
        /// - whether the target has been found in this round
        ///
        /// Replies received after the timeout are ignored and the probe is
        /// counted as lost.  Duplicate replies are ignored.
        #[instrument(skip(self), level = "trace")]
        pub fn complete_probe(&mut self, resp: StrategyResponse) {
            let ProbeStatus::Awaited(awaited) = self.probe_at(resp.sequence) else {
                return;
            };
            let rtt = resp.received.duration_since(awaited.sent).unwrap_or_default();
            if rtt > self.config.timeout {
                tracing::debug!(sequence = resp.sequence.0, ?rtt, "late response ignored");
                return;
            }
            let completed = awaited.complete(resp.addr, resp.received, resp.icmp_packet_type);
            let ttl = completed.ttl;
            self.buffer[usize::from(resp.sequence - self.round_sequence)] =
                ProbeStatus::Complete(completed);

            // A non-target reply at or beyond the known target ttl means the
            // path has changed and the target ttl is no longer valid.
            self.target_ttl = if resp.is_target {
                match self.target_ttl {
                    Some(target_ttl) if target_ttl <= ttl => Some(target_ttl),
                    _ => Some(ttl),
                }
            } else {
                match self.target_ttl {
                    Some(target_ttl) if ttl >= target_ttl => None,
                    target_ttl => target_ttl,
                }
            };

            self.max_received_ttl = match self.max_received_ttl {
                None => Some(ttl),
                Some(max_received_ttl) => Some(max_received_ttl.max(ttl)),
            };

            self.target_found |= resp.is_target;
        }

        /// Advance to the next round.
        ///
        /// The sequence number is reset here, rather than during a round, if
        /// it has gone above the max sequence number.
        #[instrument(skip(self), level = "trace")]
        pub fn advance_round(&mut self) {
            if self.sequence >= MAX_SEQUENCE {
                self.sequence = self.config.initial_sequence;
            }
            self.buffer.fill(ProbeStatus::NotSent);
            self.target_found = false;
            self.round_sequence = self.sequence;
            self.max_received_ttl = None;
            self.round += RoundId(1);
            self.ttl = TimeToLive(1);
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StateConfig;
    use crate::net::sim::SimNetwork;
    use crate::net::MockNetwork;
    use crate::probe::ResponseData;
    use crate::state::HopStatus;
    use crate::types::MaxRounds;
    use std::cell::RefCell;
    use std::net::Ipv4Addr;
    use std::num::NonZeroUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const TARGET: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9));
    const ROUTER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

    fn cfg(count: usize, max_hops: u8, max_unknown_hops: u8) -> StrategyConfig {
        StrategyConfig {
            target_addr: TARGET,
            trace_identifier: TraceId(1234),
            max_rounds: MaxRounds(NonZeroUsize::new(count).unwrap()),
            timeout: Duration::from_millis(20),
            interval: Duration::ZERO,
            hop_sleep: Duration::ZERO,
            max_hops: TimeToLive(max_hops),
            max_unknown_hops,
            initial_sequence: Sequence(33434),
        }
    }

    fn table(max_hops: u8) -> RwLock<State> {
        RwLock::new(State::new(StateConfig {
            target_addr: TARGET,
            max_hops: TimeToLive(max_hops),
            ring_buffer_size: 10,
        }))
    }

    #[test]
    fn test_single_hop_destination_reached() -> anyhow::Result<()> {
        let table = table(1);
        let network = SimNetwork::new(TARGET, vec![]);
        let sends = network.sends();
        let strategy = Strategy::new(&cfg(1, 1, 10), CancellationToken::new(), |_| {});
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::DestinationReached, outcome);
        assert_eq!(1, sends.load(Ordering::SeqCst));
        let table = table.read();
        let hop = table.hop(TimeToLive(1)).unwrap();
        assert_eq!(Some(TARGET), hop.addr());
        assert_eq!(1, hop.sent());
        assert_eq!(0, hop.lost());
        assert_eq!(HopStatus::DestinationReached, hop.status());
        Ok(())
    }

    #[test]
    fn test_all_rounds_run_after_reaching_destination() -> anyhow::Result<()> {
        let table = table(10);
        let network = SimNetwork::new(TARGET, vec![Some(ROUTER)]);
        let rounds = RefCell::new(vec![]);
        let strategy = Strategy::new(&cfg(3, 10, 10), CancellationToken::new(), |round| {
            rounds
                .borrow_mut()
                .push((round.round, round.largest_ttl, round.probes.len()));
        });
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::DestinationReached, outcome);
        assert_eq!(
            vec![
                (RoundId(0), TimeToLive(2), 2),
                (RoundId(1), TimeToLive(2), 2),
                (RoundId(2), TimeToLive(2), 2),
            ],
            rounds.into_inner()
        );
        let table = table.read();
        assert_eq!(3, table.round_count());
        assert_eq!(2, table.reported_hops().len());
        let router = table.hop(TimeToLive(1)).unwrap();
        assert_eq!(Some(ROUTER), router.addr());
        assert_eq!(3, router.sent());
        assert_eq!(HopStatus::Responding, router.status());
        let target = table.hop(TimeToLive(2)).unwrap();
        assert_eq!(3, target.sent());
        assert_eq!(HopStatus::DestinationReached, target.status());
        Ok(())
    }

    #[test]
    fn test_unknown_hop_limit_stops_run() -> anyhow::Result<()> {
        let table = table(30);
        let network = SimNetwork::new(TARGET, vec![None; 30]);
        let sends = network.sends();
        let strategy = Strategy::new(&cfg(5, 30, 2), CancellationToken::new(), |_| {});
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::UnknownHopLimitExceeded, outcome);
        assert_eq!(3, sends.load(Ordering::SeqCst));
        let table = table.read();
        assert_eq!(1, table.round_count());
        for ttl in 1..=3 {
            let hop = table.hop(TimeToLive(ttl)).unwrap();
            assert_eq!(1, hop.sent());
            assert_eq!(1, hop.lost());
            assert_eq!(HopStatus::Unknown, hop.status());
        }
        Ok(())
    }

    #[test]
    fn test_silent_hop_within_limit() -> anyhow::Result<()> {
        let table = table(10);
        let network = SimNetwork::new(TARGET, vec![Some(ROUTER), None]);
        let strategy = Strategy::new(&cfg(2, 10, 3), CancellationToken::new(), |_| {});
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::DestinationReached, outcome);
        let table = table.read();
        let silent = table.hop(TimeToLive(2)).unwrap();
        assert_eq!(None, silent.addr());
        assert_eq!(2, silent.sent());
        assert_eq!(2, silent.lost());
        assert_eq!(Some(TimeToLive(3)), table.reached_ttl());
        Ok(())
    }

    #[test]
    fn test_max_hops_exceeded() -> anyhow::Result<()> {
        let table = table(2);
        let network = SimNetwork::new(TARGET, vec![Some(ROUTER); 5]);
        let sends = network.sends();
        let strategy = Strategy::new(&cfg(5, 2, 10), CancellationToken::new(), |_| {});
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::MaxHopsExceeded, outcome);
        assert_eq!(10, sends.load(Ordering::SeqCst));
        assert_eq!(5, table.read().round_count());
        Ok(())
    }

    #[test]
    fn test_target_at_max_hops_lost_in_first_round() -> anyhow::Result<()> {
        let table = table(1);
        let network = SimNetwork::new(TARGET, vec![]).lose_first(1);
        let sends = network.sends();
        let strategy = Strategy::new(&cfg(5, 1, 10), CancellationToken::new(), |_| {});
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::DestinationReached, outcome);
        assert_eq!(5, sends.load(Ordering::SeqCst));
        let table = table.read();
        assert_eq!(5, table.round_count());
        let hop = table.hop(TimeToLive(1)).unwrap();
        assert_eq!(Some(TARGET), hop.addr());
        assert_eq!(5, hop.sent());
        assert_eq!(1, hop.lost());
        Ok(())
    }

    #[test]
    fn test_cancel_stops_sending_and_releases_network() -> anyhow::Result<()> {
        let table = table(30);
        let cancel = CancellationToken::new();
        let network = SimNetwork::new(TARGET, vec![None; 30]).cancel_after(2, cancel.clone());
        let sends = network.sends();
        let dropped = network.dropped();
        let strategy = Strategy::new(&cfg(5, 30, 20), cancel, |_| {});
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::Cancelled, outcome);
        assert_eq!(2, sends.load(Ordering::SeqCst));
        assert!(dropped.load(Ordering::SeqCst));
        Ok(())
    }

    #[test]
    fn test_cancelled_before_start() -> anyhow::Result<()> {
        let table = table(30);
        let mut network = MockNetwork::new();
        network.expect_send_probe().never();
        network.expect_recv_probe().never();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let strategy = Strategy::new(&cfg(5, 30, 2), cancel, |_| {});
        assert_eq!(RunOutcome::Cancelled, strategy.run(network, &table)?);
        assert_eq!(0, table.read().round_count());
        Ok(())
    }

    #[test]
    fn test_probe_failed_counted_as_lost() -> anyhow::Result<()> {
        let table = table(1);
        let mut network = MockNetwork::new();
        network.expect_send_probe().times(1).returning(|_| {
            Err(Error::ProbeFailed(crate::error::IoError::Other(
                std::io::Error::from(std::io::ErrorKind::Other),
                crate::error::IoOperation::Read,
            )))
        });
        network.expect_recv_probe().returning(|| Ok(None));
        let strategy = Strategy::new(&cfg(1, 1, 10), CancellationToken::new(), |_| {});
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::MaxHopsExceeded, outcome);
        let table = table.read();
        let hop = table.hop(TimeToLive(1)).unwrap();
        assert_eq!(1, hop.sent());
        assert_eq!(1, hop.lost());
        Ok(())
    }

    #[test]
    fn test_fatal_send_error() {
        let table = table(1);
        let mut network = MockNetwork::new();
        network
            .expect_send_probe()
            .times(1)
            .returning(|_| Err(Error::Other(String::from("boom"))));
        let strategy = Strategy::new(&cfg(1, 1, 10), CancellationToken::new(), |_| {});
        let err = strategy.run(network, &table).unwrap_err();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_foreign_identifier_ignored() -> anyhow::Result<()> {
        let table = table(1);
        let mut network = MockNetwork::new();
        network.expect_send_probe().times(1).returning(|_| Ok(()));
        let mut delivered = false;
        network.expect_recv_probe().returning(move || {
            if delivered {
                return Ok(None);
            }
            delivered = true;
            Ok(Some(Response::EchoReply(ResponseData::new(
                SystemTime::now(),
                TARGET,
                4321,
                33434,
            ))))
        });
        let strategy = Strategy::new(&cfg(1, 1, 10), CancellationToken::new(), |_| {});
        let outcome = strategy.run(network, &table)?;
        assert_eq!(RunOutcome::MaxHopsExceeded, outcome);
        let table = table.read();
        let hop = table.hop(TimeToLive(1)).unwrap();
        assert_eq!(1, hop.lost());
        assert_eq!(None, hop.addr());
        Ok(())
    }

    #[test]
    fn test_time_exceeded_from_target_is_target() {
        let config = cfg(1, 1, 10);
        let resp = StrategyResponse::from((
            Response::TimeExceeded(ResponseData::new(SystemTime::now(), TARGET, 1234, 33434)),
            &config,
        ));
        assert!(resp.is_target);
        assert_eq!(IcmpPacketType::TimeExceeded, resp.icmp_packet_type);
        assert_eq!(Sequence(33434), resp.sequence);
    }
}
