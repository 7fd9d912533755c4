use crate::types::Sequence;
use std::collections::VecDeque;
use std::time::Duration;

/// The outcome of a single probe.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SampleOutcome {
    /// An echo reply or time exceeded notification was received.
    Reply,
    /// No response was received before the probe timed out.
    Lost,
}

/// The result of one probe, as held in a hop's history.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Sample {
    /// The sequence number of the probe.
    pub sequence: Sequence,
    /// The round trip time, zero for lost probes.
    pub elapsed: Duration,
    pub outcome: SampleOutcome,
}

impl Sample {
    #[must_use]
    pub const fn reply(sequence: Sequence, elapsed: Duration) -> Self {
        Self {
            sequence,
            elapsed,
            outcome: SampleOutcome::Reply,
        }
    }

    #[must_use]
    pub const fn lost(sequence: Sequence) -> Self {
        Self {
            sequence,
            elapsed: Duration::ZERO,
            outcome: SampleOutcome::Lost,
        }
    }

    /// The round trip time if this sample is a reply.
    #[must_use]
    pub const fn rtt(&self) -> Option<Duration> {
        match self.outcome {
            SampleOutcome::Reply => Some(self.elapsed),
            SampleOutcome::Lost => None,
        }
    }
}

/// A fixed capacity history of the most recent samples of a hop.
///
/// Once full, each push evicts the oldest sample.  Samples are kept in
/// insertion order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RingBuffer {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl RingBuffer {
    /// Create an empty buffer.
    ///
    /// A `capacity` of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The live samples, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// The round trip times of the live reply samples, oldest first.
    pub fn rtts(&self) -> impl DoubleEndedIterator<Item = Duration> + '_ {
        self.samples.iter().filter_map(Sample::rtt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_push_within_capacity() {
        let mut ring = RingBuffer::new(3);
        ring.push(Sample::reply(Sequence(1), ms(10)));
        ring.push(Sample::lost(Sequence(2)));
        assert_eq!(2, ring.len());
        assert_eq!(3, ring.capacity());
        assert_eq!(vec![ms(10)], ring.rtts().collect::<Vec<_>>());
    }

    #[test]
    fn test_oldest_evicted() {
        let mut ring = RingBuffer::new(3);
        ring.push(Sample::reply(Sequence(1), ms(10)));
        ring.push(Sample::lost(Sequence(2)));
        ring.push(Sample::reply(Sequence(3), ms(30)));
        ring.push(Sample::reply(Sequence(4), ms(20)));
        assert_eq!(3, ring.len());
        let samples = ring.iter().copied().collect::<Vec<_>>();
        assert_eq!(
            vec![
                Sample::lost(Sequence(2)),
                Sample::reply(Sequence(3), ms(30)),
                Sample::reply(Sequence(4), ms(20)),
            ],
            samples
        );
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut ring = RingBuffer::new(5);
        for i in 0..100 {
            ring.push(Sample::reply(Sequence(i), ms(u64::from(i))));
            assert!(ring.len() <= 5);
        }
        assert_eq!(Some(Sequence(95)), ring.iter().next().map(|s| s.sequence));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut ring = RingBuffer::new(0);
        ring.push(Sample::lost(Sequence(1)));
        ring.push(Sample::lost(Sequence(2)));
        assert_eq!(1, ring.len());
    }

    #[test]
    fn test_lost_has_no_rtt() {
        assert_eq!(None, Sample::lost(Sequence(0)).rtt());
        assert_eq!(Some(ms(1)), Sample::reply(Sequence(0), ms(1)).rtt());
    }
}
