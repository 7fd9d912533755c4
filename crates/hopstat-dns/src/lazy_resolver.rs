use crate::config::Config;
use crate::resolver::{DnsEntry, Resolver, ResolvedIpAddrs, Result};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

/// A callback invoked by the background worker each time a reverse lookup
/// completes.
pub type Listener = Arc<dyn Fn(&DnsEntry) + Send + Sync + 'static>;

/// A reverse lookup function used in place of DNS.
pub type ReverseLookup = Arc<dyn Fn(IpAddr) -> DnsEntry + Send + Sync + 'static>;

/// A cheaply cloneable, non-blocking, caching, forward and reverse DNS resolver.
///
/// Reverse lookups are performed on a single background worker thread.  Each
/// completed lookup is stored in the cache and, if one was supplied, passed to
/// the `Listener`.
///
/// A resolver may be cancelled, after which no further lookups are started and
/// the `Listener` is never invoked again.
#[derive(Clone)]
pub struct DnsResolver {
    inner: Arc<inner::DnsResolver>,
}

impl DnsResolver {
    /// Create and start a new `DnsResolver`.
    pub fn start(config: Config) -> std::io::Result<Self> {
        Ok(Self {
            inner: Arc::new(inner::DnsResolver::start(config, None)?),
        })
    }

    /// Create and start a new `DnsResolver` which notifies `listener` as each
    /// reverse lookup completes.
    pub fn start_with_listener(config: Config, listener: Listener) -> std::io::Result<Self> {
        Ok(Self {
            inner: Arc::new(inner::DnsResolver::start(config, Some(listener))?),
        })
    }

    /// Create and start a new `DnsResolver` which answers reverse lookups
    /// with `lookup`, such as from a static hosts table, rather than DNS.
    ///
    /// Forward lookups only accept address literals.
    #[must_use]
    pub fn start_with_lookup(
        config: Config,
        lookup: ReverseLookup,
        listener: Option<Listener>,
    ) -> Self {
        Self {
            inner: Arc::new(inner::DnsResolver::with_provider(
                config,
                inner::DnsProvider::Custom(lookup),
                listener,
            )),
        }
    }

    /// Get the `Config`.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.inner.config()
    }

    /// Resolve `hostname` to its first `IPv4` address.
    pub fn lookup_ipv4(&self, hostname: impl AsRef<str>) -> Result<Ipv4Addr> {
        self.inner.lookup_ipv4(hostname.as_ref())
    }

    /// Stop resolving.
    ///
    /// Queued lookups are discarded and a lookup already in progress is
    /// dropped when it returns.  If the `Listener` is running this waits for
    /// it to return, after which it is never called again.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Block until no lookups are queued or in progress, or until `timeout`
    /// elapses.
    ///
    /// Returns `true` if the resolver became idle.
    #[must_use]
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.inner.wait_idle(timeout)
    }

    /// Flush the cache of responses.
    pub fn flush(&self) {
        self.inner.flush();
    }
}

impl Resolver for DnsResolver {
    fn lookup(&self, hostname: impl AsRef<str>) -> Result<ResolvedIpAddrs> {
        self.inner.lookup(hostname.as_ref())
    }
    fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
        self.inner.reverse_lookup(addr.into(), false)
    }
    fn lazy_reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
        self.inner.reverse_lookup(addr.into(), true)
    }
}

/// Private impl of resolver.
mod inner {
    use super::{Config, Listener, ReverseLookup};
    use crate::config::ResolveMethod;
    use crate::resolver::{DnsEntry, Error, ResolvedIpAddrs, Result};
    use crossbeam::channel::{bounded, Receiver, Sender};
    use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
    use hickory_resolver::error::ResolveErrorKind;
    use hickory_resolver::system_conf::read_system_conf;
    use hickory_resolver::Resolver;
    use itertools::Itertools;
    use parking_lot::{Condvar, Mutex, RwLock};
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant, SystemTime};
    use tracing::instrument;

    /// The maximum number of in-flight reverse DNS resolutions.
    const RESOLVER_MAX_QUEUE_SIZE: usize = 100;

    /// The duration wait to enqueue a `DnsEntry::Pending` to the resolver before returning
    /// `DnsEntry::Timeout`.
    const RESOLVER_QUEUE_TIMEOUT: Duration = Duration::from_millis(10);

    /// Alias for a cache of reverse DNS lookup entries.
    type Cache = Arc<RwLock<HashMap<IpAddr, CacheEntry>>>;

    /// A cache entry for a reverse DNS lookup.
    #[derive(Debug, Clone)]
    struct CacheEntry {
        entry: DnsEntry,
        timestamp: SystemTime,
    }

    impl CacheEntry {
        const fn new(entry: DnsEntry, timestamp: SystemTime) -> Self {
            Self { entry, timestamp }
        }
    }

    #[derive(Clone)]
    pub(crate) enum DnsProvider {
        Hickory(Arc<Resolver>),
        DnsLookup,
        Custom(ReverseLookup),
    }

    /// The number of lookups queued or in progress.
    #[derive(Debug, Default)]
    struct Pending {
        count: Mutex<usize>,
        idle: Condvar,
    }

    impl Pending {
        fn add(&self) {
            *self.count.lock() += 1;
        }

        fn done(&self) {
            let mut count = self.count.lock();
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.idle.notify_all();
            }
        }

        fn wait_idle(&self, timeout: Duration) -> bool {
            let deadline = Instant::now() + timeout;
            let mut count = self.count.lock();
            while *count > 0 {
                if self.idle.wait_until(&mut count, deadline).timed_out() {
                    return *count == 0;
                }
            }
            true
        }
    }

    /// State shared with the worker thread.
    ///
    /// The `notify` lock is held while the listener runs and while the
    /// resolver is cancelled.
    struct Shared {
        cache: Cache,
        pending: Pending,
        cancelled: AtomicBool,
        notify: Mutex<()>,
        listener: Option<Listener>,
    }

    /// Resolver implementation.
    pub(crate) struct DnsResolver {
        config: Config,
        provider: DnsProvider,
        tx: Sender<IpAddr>,
        shared: Arc<Shared>,
    }

    impl DnsResolver {
        pub(crate) fn start(config: Config, listener: Option<Listener>) -> std::io::Result<Self> {
            tracing::debug!(?config, "starting dns resolver");
            let provider = if matches!(config.resolve_method, ResolveMethod::System) {
                DnsProvider::DnsLookup
            } else {
                let mut options = ResolverOpts::default();
                options.timeout = config.timeout;
                options.ip_strategy = LookupIpStrategy::Ipv4Only;
                let res = match config.resolve_method {
                    ResolveMethod::Resolv => {
                        let (resolver_cfg, mut options) = read_system_conf()?;
                        options.timeout = config.timeout;
                        options.ip_strategy = LookupIpStrategy::Ipv4Only;
                        Resolver::new(resolver_cfg, options)
                    }
                    ResolveMethod::Google => Resolver::new(ResolverConfig::google(), options),
                    ResolveMethod::Cloudflare => {
                        Resolver::new(ResolverConfig::cloudflare(), options)
                    }
                    ResolveMethod::System => unreachable!(),
                }?;
                DnsProvider::Hickory(Arc::new(res))
            };
            Ok(Self::with_provider(config, provider, listener))
        }

        pub(crate) fn with_provider(
            config: Config,
            provider: DnsProvider,
            listener: Option<Listener>,
        ) -> Self {
            let (tx, rx) = bounded(RESOLVER_MAX_QUEUE_SIZE);
            let shared = Arc::new(Shared {
                cache: Arc::new(RwLock::new(HashMap::new())),
                pending: Pending::default(),
                cancelled: AtomicBool::new(false),
                notify: Mutex::new(()),
                listener,
            });

            // spawn a thread to process the resolve queue
            {
                let shared = shared.clone();
                let provider = provider.clone();
                thread::spawn(move || resolver_queue_processor(&rx, &provider, &shared));
            }
            Self {
                config,
                provider,
                tx,
                shared,
            }
        }

        pub(crate) const fn config(&self) -> &Config {
            &self.config
        }

        pub(crate) fn lookup(&self, hostname: &str) -> Result<ResolvedIpAddrs> {
            match &self.provider {
                DnsProvider::Hickory(resolver) => Ok(resolver
                    .lookup_ip(hostname)
                    .map_err(|err| Error::LookupFailed(Box::new(err)))?
                    .iter()
                    .unique()
                    .collect::<Vec<_>>()),
                DnsProvider::DnsLookup => Ok(dns_lookup::lookup_host(hostname)
                    .map_err(|err| Error::LookupFailed(Box::new(err)))?
                    .into_iter()
                    .unique()
                    .collect::<Vec<_>>()),
                DnsProvider::Custom(_) => hostname
                    .parse::<IpAddr>()
                    .map(|addr| vec![addr])
                    .map_err(|err| Error::LookupFailed(Box::new(err))),
            }
            .map(ResolvedIpAddrs)
        }

        pub(crate) fn lookup_ipv4(&self, hostname: &str) -> Result<Ipv4Addr> {
            self.lookup(hostname)?
                .into_iter()
                .find_map(|addr| match addr {
                    IpAddr::V4(addr) => Some(addr),
                    IpAddr::V6(_) => None,
                })
                .ok_or_else(|| Error::NoIpv4Addr(hostname.to_string()))
        }

        pub(crate) fn reverse_lookup(&self, addr: IpAddr, lazy: bool) -> DnsEntry {
            if lazy {
                self.lazy_reverse_lookup(addr).entry
            } else {
                reverse_lookup(&self.provider, addr).entry
            }
        }

        pub(crate) fn cancel(&self) {
            let _notify = self.shared.notify.lock();
            if !self.shared.cancelled.swap(true, Ordering::SeqCst) {
                tracing::debug!("dns resolver cancelled");
            }
        }

        pub(crate) fn is_cancelled(&self) -> bool {
            self.shared.cancelled.load(Ordering::SeqCst)
        }

        pub(crate) fn wait_idle(&self, timeout: Duration) -> bool {
            self.shared.pending.wait_idle(timeout)
        }

        pub(crate) fn flush(&self) {
            self.shared.cache.write().clear();
        }

        #[instrument(skip(self), level = "trace")]
        fn lazy_reverse_lookup(&self, addr: IpAddr) -> CacheEntry {
            let mut enqueue = false;
            let now = SystemTime::now();

            // Return the current entry if this addr has been seen before, otherwise add it as
            // `DnsEntry::Pending`.
            let mut dns_entry = {
                let mut cache = self.shared.cache.write();
                let entry = cache.entry(addr).or_insert_with(|| {
                    enqueue = true;
                    CacheEntry::new(DnsEntry::Pending(addr), now)
                });
                match entry.entry {
                    // stale entries are returned until refreshed, the timestamp is
                    // reset so that they are only enqueued once.
                    DnsEntry::Resolved(..) | DnsEntry::NotFound(_) | DnsEntry::Failed(_) => {
                        if now.duration_since(entry.timestamp).unwrap_or_default()
                            > self.config.ttl
                        {
                            entry.timestamp = now;
                            enqueue = true;
                        }
                    }
                    DnsEntry::Timeout(_) => {
                        *entry = CacheEntry::new(DnsEntry::Pending(addr), now);
                        enqueue = true;
                    }
                    DnsEntry::Pending(_) => {}
                }
                entry.clone()
            };

            if enqueue && !self.is_cancelled() {
                self.shared.pending.add();
                if self.tx.send_timeout(addr, RESOLVER_QUEUE_TIMEOUT).is_err() {
                    self.shared.pending.done();
                    dns_entry = CacheEntry::new(DnsEntry::Timeout(addr), now);
                    self.shared.cache.write().insert(addr, dns_entry.clone());
                }
            }
            dns_entry
        }
    }

    /// Process each `IpAddr` from the resolver queue and perform the reverse DNS lookup.
    ///
    /// The cache lock is released before the listener is notified.  The
    /// cancelled flag is checked again under the `notify` lock so that no
    /// result is published once `cancel` has returned.
    fn resolver_queue_processor(rx: &Receiver<IpAddr>, provider: &DnsProvider, shared: &Shared) {
        for addr in rx {
            if !shared.cancelled.load(Ordering::SeqCst) {
                let dns_entry = reverse_lookup(provider, addr);
                let _notify = shared.notify.lock();
                if !shared.cancelled.load(Ordering::SeqCst) {
                    tracing::trace!(entry = ?dns_entry.entry, "reverse lookup complete");
                    shared.cache.write().insert(addr, dns_entry.clone());
                    if let Some(listener) = &shared.listener {
                        listener(&dns_entry.entry);
                    }
                }
            }
            shared.pending.done();
        }
        tracing::trace!("dns resolver worker exiting");
    }

    fn reverse_lookup(provider: &DnsProvider, addr: IpAddr) -> CacheEntry {
        let now = SystemTime::now();
        match &provider {
            DnsProvider::DnsLookup => {
                // failures and genuine errors can't be told apart so all are `NotFound`
                match dns_lookup::lookup_addr(&addr) {
                    Ok(dns) => CacheEntry::new(DnsEntry::Resolved(addr, vec![dns]), now),
                    Err(_) => CacheEntry::new(DnsEntry::NotFound(addr), now),
                }
            }
            DnsProvider::Hickory(resolver) => match resolver.reverse_lookup(addr) {
                Ok(name) => {
                    let hostnames = name
                        .into_iter()
                        .map(|mut s| {
                            s.0.set_fqdn(false);
                            s
                        })
                        .map(|s| s.to_string())
                        .collect();
                    CacheEntry::new(DnsEntry::Resolved(addr, hostnames), now)
                }
                Err(err) => match err.kind() {
                    ResolveErrorKind::NoRecordsFound { .. } => {
                        CacheEntry::new(DnsEntry::NotFound(addr), now)
                    }
                    ResolveErrorKind::Timeout => CacheEntry::new(DnsEntry::Timeout(addr), now),
                    _ => CacheEntry::new(DnsEntry::Failed(addr), now),
                },
            },
            DnsProvider::Custom(lookup) => CacheEntry::new(lookup(addr), now),
        }
    }
}
