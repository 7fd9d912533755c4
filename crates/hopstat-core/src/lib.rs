//! Hopstat - a multi-hop ICMP probe and statistics engine.
//!
//! For a target host this crate discovers the routers along the network path
//! by sending ICMP echo requests with an increasing time-to-live, and measures
//! the packet loss and round trip latency of every hop over repeated rounds.
//!
//! A run is configured once with a [`Builder`] and driven by a [`Tracer`].
//! Each hop keeps lifetime `sent` and `lost` counters alongside a bounded
//! history of its most recent samples, from which loss and latency
//! statistics are computed on demand.  The run ends when every round has
//! completed, when too many consecutive hops stay silent, when the hop
//! ceiling is reached or when it is cancelled.  A [`RunResult`] is a
//! read-only copy of the hop table which may be taken at any time.
//!
//! # Example
//!
//! The following example runs 5 rounds against a target and prints the
//! statistics of each hop:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::IpAddr;
//! # use std::str::FromStr;
//! use hopstat_core::Builder;
//!
//! let addr = IpAddr::from_str("1.1.1.1")?;
//! let tracer = Builder::new(addr).count(5).reverse_lookup(true).build()?;
//! let outcome = tracer.run()?;
//! let result = tracer.result();
//! println!("{outcome}");
//! for hop in &result.hops {
//!     println!("{:>3} {:?} {:.1}% {:?}", hop.ttl, hop.addr, hop.loss_pct, hop.avg);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Tracer`].
//! - [`Tracer::run`] - Run the tracer on the current thread.
//! - [`Tracer::run_with`] - Run the tracer with a custom round handler.
//! - [`Tracer::spawn`] - Run the tracer on a new thread.
//! - [`Tracer::cancel`] - Cancel a running tracer.
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::use_self,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![deny(unsafe_code)]

mod aggregate;
mod builder;
mod completion;
mod config;
mod error;
mod net;
mod probe;
mod ring;
mod state;
mod strategy;
mod tracer;
mod types;

pub use aggregate::{aggregate, loss_pct, HopStats};
pub use builder::Builder;
pub use completion::{Completion, CompletionDetector, RunOutcome};
pub use config::{defaults, MAX_TTL};
pub use error::{Error, ErrorKind, IoError, IoOperation, Result};
pub use probe::{IcmpPacketType, Probe, ProbeComplete, ProbeStatus};
pub use ring::{RingBuffer, Sample, SampleOutcome};
pub use state::{Hop, HopResult, HopStatus, RunResult, State};
pub use strategy::Round;
pub use tracer::Tracer;
pub use types::{MaxRounds, PacketSize, RoundId, Sequence, TimeToLive, TraceId};
