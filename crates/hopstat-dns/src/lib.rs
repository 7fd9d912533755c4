//! A cheaply cloneable, non-blocking, caching forward and reverse DNS
//! resolver.
//!
//! Only a single reverse DNS lookup is performed (lazily) for each address
//! regardless of how often it is requested unless:
//! - the previous lookup failed with `DnsEntry::Timeout(_)`
//! - the previous lookup is older than the configured time-to-live (TTL)
//!
//! A `Listener` may be supplied to be told about each completed lookup, and
//! the resolver may be cancelled at any time.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::IpAddr;
//! # use std::str::FromStr;
//! # use std::time::Duration;
//! use hopstat_dns::{Builder, DnsResolver, ResolveMethod, Resolver};
//!
//! let config = Builder::new()
//!     .resolve_method(ResolveMethod::Cloudflare)
//!     .timeout(Duration::from_secs(2))
//!     .build();
//! let resolver = DnsResolver::start(config)?;
//! let addr = IpAddr::from_str("1.1.1.1")?;
//! let _pending = resolver.lazy_reverse_lookup(addr);
//! if resolver.wait_idle(Duration::from_secs(5)) {
//!     println!("{}", resolver.lazy_reverse_lookup(addr));
//! }
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::option_if_let_else
)]
#![forbid(unsafe_code)]

mod config;
mod lazy_resolver;
mod resolver;

pub use config::{Builder, Config, ResolveMethod};
pub use lazy_resolver::{DnsResolver, Listener, ReverseLookup};
pub use resolver::{DnsEntry, Error, ResolvedIpAddrs, Resolver, Result};
