//! Loss and latency statistics derived from a hop's counters and history.
use crate::ring::RingBuffer;
use std::time::Duration;

/// Statistics for a single hop.
///
/// The timing fields are `None` when the history holds no reply samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopStats {
    /// Percentage of sent probes which were lost over the whole run.
    pub loss_pct: f64,
    /// The round trip time of the most recent reply.
    pub last: Option<Duration>,
    /// The mean round trip time of the live replies.
    pub avg: Option<Duration>,
    /// The minimum round trip time of the live replies.
    pub best: Option<Duration>,
    /// The maximum round trip time of the live replies.
    pub worst: Option<Duration>,
}

/// The loss percentage for cumulative `sent` and `lost` counters.
///
/// Zero when nothing has been sent.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn loss_pct(sent: usize, lost: usize) -> f64 {
    if sent > 0 {
        lost as f64 / sent as f64 * 100_f64
    } else {
        0_f64
    }
}

/// Compute the statistics of a hop.
///
/// Lost samples contribute to the loss percentage through the counters only.
#[must_use]
pub fn aggregate(ring: &RingBuffer, sent: usize, lost: usize) -> HopStats {
    let last = ring.rtts().next_back();
    let (count, total, best, worst) = ring.rtts().fold(
        (0_u32, Duration::ZERO, None, None),
        |(count, total, best, worst): (u32, Duration, Option<Duration>, Option<Duration>), rtt| {
            (
                count + 1,
                total + rtt,
                Some(best.map_or(rtt, |b: Duration| b.min(rtt))),
                Some(worst.map_or(rtt, |w: Duration| w.max(rtt))),
            )
        },
    );
    let avg = (count > 0).then(|| total / count);
    HopStats {
        loss_pct: loss_pct(sent, lost),
        last,
        avg,
        best,
        worst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::Sample;
    use crate::types::Sequence;
    use test_case::test_case;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test_case(0, 0, 0.0; "nothing sent")]
    #[test_case(4, 1, 25.0; "one in four")]
    #[test_case(3, 3, 100.0; "all lost")]
    #[test_case(10, 0, 0.0; "none lost")]
    fn test_loss_pct(sent: usize, lost: usize, expected: f64) {
        assert!((loss_pct(sent, lost) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_evicted_sample_ignored() {
        let mut ring = RingBuffer::new(3);
        ring.push(Sample::reply(Sequence(0), ms(10)));
        ring.push(Sample::lost(Sequence(1)));
        ring.push(Sample::reply(Sequence(2), ms(30)));
        ring.push(Sample::reply(Sequence(3), ms(20)));
        let stats = aggregate(&ring, 4, 1);
        assert_eq!(Some(ms(20)), stats.last);
        assert_eq!(Some(ms(25)), stats.avg);
        assert_eq!(Some(ms(20)), stats.best);
        assert_eq!(Some(ms(30)), stats.worst);
        assert!((stats.loss_pct - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_replies() {
        let mut ring = RingBuffer::new(3);
        ring.push(Sample::lost(Sequence(0)));
        ring.push(Sample::lost(Sequence(1)));
        let stats = aggregate(&ring, 2, 2);
        assert_eq!(None, stats.last);
        assert_eq!(None, stats.avg);
        assert_eq!(None, stats.best);
        assert_eq!(None, stats.worst);
        assert!((stats.loss_pct - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty() {
        let stats = aggregate(&RingBuffer::new(5), 0, 0);
        assert_eq!(None, stats.avg);
        assert!(stats.loss_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn test_last_skips_trailing_loss() {
        let mut ring = RingBuffer::new(5);
        ring.push(Sample::reply(Sequence(0), ms(7)));
        ring.push(Sample::lost(Sequence(1)));
        assert_eq!(Some(ms(7)), aggregate(&ring, 2, 1).last);
    }

    #[test]
    fn test_best_avg_worst_ordering() {
        let mut ring = RingBuffer::new(10);
        for (i, rtt) in [13, 2, 97, 41, 41, 8].into_iter().enumerate() {
            ring.push(Sample::reply(Sequence(i as u16), ms(rtt)));
        }
        let stats = aggregate(&ring, 6, 0);
        let (best, avg, worst) = (stats.best.unwrap(), stats.avg.unwrap(), stats.worst.unwrap());
        assert!(best <= avg && avg <= worst);
        assert_eq!(ms(2), best);
        assert_eq!(ms(97), worst);
    }
}
