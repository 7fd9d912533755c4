use crate::error::Result;
use crate::net::Network;
use crate::probe::{Probe, Response, ResponseData};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;

/// A `Network` which answers probes from a fixed route.
///
/// The hop at index `n` of the route answers probes sent with a ttl of
/// `n + 1`.  A `None` hop never answers.  Probes with a ttl beyond the end of
/// the route are answered by the target.
#[derive(Debug)]
pub struct SimNetwork {
    target: IpAddr,
    route: Vec<Option<IpAddr>>,
    pending: VecDeque<Probe>,
    sends: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
    cancel_after: Option<(usize, CancellationToken)>,
    lose_first: usize,
}

impl SimNetwork {
    pub fn new(target: IpAddr, route: Vec<Option<IpAddr>>) -> Self {
        Self {
            target,
            route,
            pending: VecDeque::new(),
            sends: Arc::new(AtomicUsize::new(0)),
            dropped: Arc::new(AtomicBool::new(false)),
            cancel_after: None,
            lose_first: 0,
        }
    }

    /// Cancel `token` once `sends` probes have been sent.
    pub fn cancel_after(mut self, sends: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((sends, token));
        self
    }

    /// Never answer the first `sends` probes sent.
    pub fn lose_first(mut self, sends: usize) -> Self {
        self.lose_first = sends;
        self
    }

    /// A shared count of the probes sent.
    pub fn sends(&self) -> Arc<AtomicUsize> {
        self.sends.clone()
    }

    /// Set once the network has been dropped.
    pub fn dropped(&self) -> Arc<AtomicBool> {
        self.dropped.clone()
    }

    fn hop(&self, probe: &Probe) -> Option<IpAddr> {
        match usize::from(probe.ttl)
            .checked_sub(1)
            .map(|index| self.route.get(index))
        {
            Some(Some(hop)) => *hop,
            _ => Some(self.target),
        }
    }
}

impl Network for SimNetwork {
    fn send_probe(&mut self, probe: Probe) -> Result<()> {
        let sends = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((limit, token)) = &self.cancel_after {
            if sends >= *limit {
                token.cancel();
            }
        }
        if sends > self.lose_first {
            self.pending.push_back(probe);
        }
        Ok(())
    }

    fn recv_probe(&mut self) -> Result<Option<Response>> {
        let Some(probe) = self.pending.pop_front() else {
            return Ok(None);
        };
        Ok(self.hop(&probe).map(|addr| {
            let data = ResponseData::new(
                SystemTime::now(),
                addr,
                probe.identifier.0,
                probe.sequence.0,
            );
            if addr == self.target {
                Response::EchoReply(data)
            } else {
                Response::TimeExceeded(data)
            }
        }))
    }
}

impl Drop for SimNetwork {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}
