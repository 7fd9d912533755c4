use crate::completion::RunOutcome;
use crate::config::TracerConfig;
use crate::error::{Error, Result};
use crate::state::{RunResult, State};
use crate::strategy::Round;
use crate::types::{MaxRounds, PacketSize, TimeToLive, TraceId};
use std::net::IpAddr;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Probe the path to a target and gather per-hop statistics.
///
/// See the [`crate`] documentation for more information.
///
/// Note that this type is cheaply cloneable.
#[derive(Debug, Clone)]
pub struct Tracer {
    inner: Arc<inner::TracerInner>,
}

impl Tracer {
    /// Create a `Tracer`.
    ///
    /// Use the [`crate::Builder`] type to create a [`Tracer`].
    #[must_use]
    pub(crate) fn new(config: TracerConfig, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(inner::TracerInner::new(config, cancel)),
        }
    }

    /// Run the [`Tracer`].
    ///
    /// This method will block until the run completes, is cancelled or fails.
    /// A run which does not reach the target is not an error, the returned
    /// [`RunOutcome`] tells how it ended.
    ///
    /// At the completion of the run, the result can be retrieved using the
    /// [`Tracer::result`] method.
    ///
    /// A `Tracer` runs once. Build a new one for each run.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// # use std::net::IpAddr;
    /// # use std::str::FromStr;
    /// use hopstat_core::Builder;
    ///
    /// let addr = IpAddr::from_str("1.1.1.1")?;
    /// let tracer = Builder::new(addr).count(3).build()?;
    /// let outcome = tracer.run()?;
    /// println!("{outcome}");
    /// for hop in tracer.result().hops {
    ///     println!("{} {:?} {:.1}%", hop.ttl, hop.addr, hop.loss_pct);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the probe sockets cannot be opened, which
    /// typically requires elevated privileges, or if sending fails.
    /// Returns [`Error::AlreadyRun`] if this `Tracer`, or a clone of it, has
    /// been run before.
    pub fn run(&self) -> Result<RunOutcome> {
        self.inner.run()
    }

    /// Run the [`Tracer`] with a custom round handler.
    ///
    /// The handler is called at the end of every round, after the hop table
    /// has been updated for it.
    ///
    /// # See Also
    ///
    /// - [`Tracer::run`] - Run the tracer without a custom round handler.
    pub fn run_with<F: Fn(&Round<'_>)>(&self, func: F) -> Result<RunOutcome> {
        self.inner.run_with(func)
    }

    /// Spawn the tracer on a new thread.
    ///
    /// This method will spawn a new thread to run the tracer and immediately
    /// return the [`Tracer`] and a handle to the thread, so it may be joined
    /// with [`JoinHandle::join`].  A [`Tracer::result`] may be taken at any
    /// time while it runs.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// # use std::net::IpAddr;
    /// # use std::str::FromStr;
    /// # use std::thread;
    /// # use std::time::Duration;
    /// use hopstat_core::Builder;
    ///
    /// let addr = IpAddr::from_str("1.1.1.1")?;
    /// let (tracer, handle) = Builder::new(addr).count(100).build()?.spawn()?;
    /// thread::sleep(Duration::from_secs(5));
    /// let _partial = tracer.result();
    /// tracer.cancel();
    /// let _outcome = handle.join().unwrap()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(self) -> Result<(Self, JoinHandle<Result<RunOutcome>>)> {
        let tracer = self.clone();
        let handle = thread::Builder::new()
            .name(format!("tracer-{}", self.trace_identifier().0))
            .spawn(move || tracer.run())
            .map_err(|err| Error::Other(err.to_string()))?;
        Ok((self, handle))
    }

    /// Take a snapshot of the hop table.
    #[must_use]
    pub fn snapshot(&self) -> State {
        self.inner.snapshot()
    }

    /// Take a read-only result of the run so far.
    ///
    /// The result is a copy and does not change as the run continues.
    #[must_use]
    pub fn result(&self) -> RunResult {
        self.inner.snapshot().result()
    }

    /// Cancel the run.
    ///
    /// No further probes are sent and the probe sockets are closed once the
    /// run returns.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// The source address used for probes, available once the run has started.
    #[must_use]
    pub fn source_addr(&self) -> Option<IpAddr> {
        self.inner.source_addr()
    }

    #[must_use]
    pub fn target_addr(&self) -> IpAddr {
        self.inner.target_addr()
    }

    #[must_use]
    pub fn interface(&self) -> Option<&str> {
        self.inner.interface()
    }

    #[must_use]
    pub fn max_rounds(&self) -> MaxRounds {
        self.inner.max_rounds()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout()
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.inner.interval()
    }

    #[must_use]
    pub fn hop_sleep(&self) -> Duration {
        self.inner.hop_sleep()
    }

    #[must_use]
    pub fn max_hops(&self) -> TimeToLive {
        self.inner.max_hops()
    }

    #[must_use]
    pub fn max_unknown_hops(&self) -> u8 {
        self.inner.max_unknown_hops()
    }

    #[must_use]
    pub fn ring_buffer_size(&self) -> usize {
        self.inner.ring_buffer_size()
    }

    #[must_use]
    pub fn reverse_lookup(&self) -> bool {
        self.inner.reverse_lookup()
    }

    #[must_use]
    pub fn packet_size(&self) -> PacketSize {
        self.inner.packet_size()
    }

    #[must_use]
    pub fn trace_identifier(&self) -> TraceId {
        self.inner.trace_identifier()
    }
}

mod inner {
    use crate::completion::RunOutcome;
    use crate::config::TracerConfig;
    use crate::error::{Error, Result};
    use crate::net::channel::Channel;
    use crate::net::source::SourceAddr;
    use crate::net::{Network, PlatformImpl, SocketImpl};
    use crate::state::State;
    use crate::strategy::{Round, Strategy};
    use crate::types::{MaxRounds, PacketSize, TimeToLive, TraceId};
    use crate::ProbeStatus;
    use hopstat_dns::{DnsEntry, DnsResolver, Listener, Resolver};
    use hopstat_privilege::Privilege;
    use parking_lot::RwLock;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use tracing::instrument;

    #[derive(Debug)]
    pub(super) struct TracerInner {
        config: TracerConfig,
        cancel: CancellationToken,
        state: Arc<RwLock<State>>,
        src: OnceLock<IpAddr>,
        started: AtomicBool,
    }

    impl TracerInner {
        pub(super) fn new(config: TracerConfig, cancel: CancellationToken) -> Self {
            let state = State::new(config.state_config());
            Self {
                config,
                cancel,
                state: Arc::new(RwLock::new(state)),
                src: OnceLock::new(),
                started: AtomicBool::new(false),
            }
        }

        #[instrument(skip_all, level = "trace")]
        pub(super) fn run(&self) -> Result<RunOutcome> {
            self.run_internal(|_| ())
                .map_err(|err| self.handle_error(err))
        }

        #[instrument(skip_all, level = "trace")]
        pub(super) fn run_with<F: Fn(&Round<'_>)>(&self, func: F) -> Result<RunOutcome> {
            self.run_internal(func)
                .map_err(|err| self.handle_error(err))
        }

        pub(super) fn snapshot(&self) -> State {
            self.state.read().clone()
        }

        pub(super) fn cancel(&self) {
            self.cancel.cancel();
        }

        pub(super) fn is_cancelled(&self) -> bool {
            self.cancel.is_cancelled()
        }

        pub(super) fn source_addr(&self) -> Option<IpAddr> {
            self.src.get().copied()
        }

        pub(super) const fn target_addr(&self) -> IpAddr {
            IpAddr::V4(self.config.target_addr)
        }

        pub(super) fn interface(&self) -> Option<&str> {
            self.config.interface.as_deref()
        }

        pub(super) const fn max_rounds(&self) -> MaxRounds {
            self.config.max_rounds
        }

        pub(super) const fn timeout(&self) -> Duration {
            self.config.timeout
        }

        pub(super) const fn interval(&self) -> Duration {
            self.config.interval
        }

        pub(super) const fn hop_sleep(&self) -> Duration {
            self.config.hop_sleep
        }

        pub(super) const fn max_hops(&self) -> TimeToLive {
            self.config.max_hops
        }

        pub(super) const fn max_unknown_hops(&self) -> u8 {
            self.config.max_unknown_hops
        }

        pub(super) const fn ring_buffer_size(&self) -> usize {
            self.config.ring_buffer_size
        }

        pub(super) const fn reverse_lookup(&self) -> bool {
            self.config.reverse_lookup
        }

        pub(super) const fn packet_size(&self) -> PacketSize {
            self.config.packet_size
        }

        pub(super) const fn trace_identifier(&self) -> TraceId {
            self.config.trace_identifier
        }

        #[instrument(skip_all, level = "trace")]
        fn run_internal<F: Fn(&Round<'_>)>(&self, func: F) -> Result<RunOutcome> {
            // if we are given a source address, validate it otherwise
            // discover it based on the target address and interface.
            let source_addr = match self.config.source_addr {
                None => SourceAddr::discover::<PlatformImpl>(
                    self.config.target_addr,
                    self.config.interface.as_deref(),
                )?,
                Some(addr) => SourceAddr::validate::<SocketImpl>(addr)?,
            };
            self.src
                .set(IpAddr::V4(source_addr))
                .map_err(|_| Error::AlreadyRun)?;
            let channel_config = self.config.channel_config(source_addr);
            let channel = Channel::<SocketImpl>::connect(&channel_config)?;
            if self.config.drop_privileges {
                Privilege::drop_privileges()?;
            }
            let dns_config = self.config.dns_config;
            self.run_on(
                channel,
                |listener| {
                    DnsResolver::start_with_listener(dns_config, listener)
                        .map_err(Error::ResolverError)
                },
                func,
            )
        }

        /// Run the rounds over `network`.
        ///
        /// Reverse lookups, if enabled, run on the resolver returned by
        /// `start_resolver` for the lifetime of the run and never outlive it.
        pub(super) fn run_on<N, S, F>(
            &self,
            network: N,
            start_resolver: S,
            func: F,
        ) -> Result<RunOutcome>
        where
            N: Network,
            S: FnOnce(Listener) -> Result<DnsResolver>,
            F: Fn(&Round<'_>),
        {
            if self.started.swap(true, Ordering::SeqCst) {
                return Err(Error::AlreadyRun);
            }
            let resolver = if self.config.reverse_lookup {
                Some(start_resolver(hostname_listener(Arc::clone(&self.state)))?)
            } else {
                None
            };
            let strategy_config = self.config.strategy_config();
            let strategy = Strategy::new(&strategy_config, self.cancel.clone(), |round| {
                if let Some(resolver) = &resolver {
                    self.lookup_hostnames(resolver, round);
                }
                func(round);
            });
            let outcome = strategy.run(network, &self.state);
            if let Some(resolver) = resolver {
                if matches!(&outcome, Ok(outcome) if *outcome != RunOutcome::Cancelled)
                    && !resolver.wait_idle(self.config.dns_grace_duration)
                {
                    tracing::debug!("reverse lookups still pending at end of run");
                }
                resolver.cancel();
            }
            let outcome = outcome?;
            tracing::debug!(%outcome, "run finished");
            self.state.write().set_outcome(outcome);
            Ok(outcome)
        }

        /// Request a reverse lookup of every address which replied in the round.
        ///
        /// Lookups which are already cached are applied immediately, the
        /// rest are applied by the listener as they complete.
        fn lookup_hostnames(&self, resolver: &DnsResolver, round: &Round<'_>) {
            for probe in round.probes {
                if let ProbeStatus::Complete(complete) = probe {
                    let entry = resolver.lazy_reverse_lookup(complete.host);
                    if let Some(hostname) = entry.hostname() {
                        self.state.write().set_hostname(entry.addr(), hostname);
                    }
                }
            }
        }

        /// Record a run error in the hop table, unless the error is that the
        /// table belongs to an earlier run.
        fn handle_error(&self, err: Error) -> Error {
            if !matches!(err, Error::AlreadyRun) {
                self.state.write().set_error(Some(err.to_string()));
            }
            err
        }
    }

    /// A `Listener` which merges each resolved hostname into the hop table.
    ///
    /// Lookups which fail leave the hostname empty.
    pub(super) fn hostname_listener(state: Arc<RwLock<State>>) -> Listener {
        Arc::new(move |entry: &DnsEntry| {
            if let Some(hostname) = entry.hostname() {
                state.write().set_hostname(entry.addr(), hostname);
            }
        })
    }
}
