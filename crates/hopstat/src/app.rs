use crate::config::{HopstatConfig, LogFormat, LogSpanEvents};
use crate::report;
use anyhow::{anyhow, Context};
use chrono::{DateTime, Local};
use hopstat_core::{Builder, Tracer};
use hopstat_dns::DnsResolver;
use std::net::{IpAddr, Ipv4Addr};
use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;

/// Run the hopstat application.
pub fn run_hopstat(cfg: &HopstatConfig) -> anyhow::Result<()> {
    configure_logging(cfg)?;
    let target_addr = resolve_target(cfg)?;
    tracing::debug!(target = %cfg.target, %target_addr, "resolved target");
    let tracer = make_tracer(cfg, target_addr)?;
    let trace_info = TraceInfo::new(tracer, cfg.target.clone());
    set_interrupt_handler(&trace_info.data)?;
    let outcome = trace_info.data.run()?;
    tracing::debug!(%outcome, "run finished");
    report::report(&trace_info, cfg.mode)
}

/// Resolve the target to an `IPv4` address.
fn resolve_target(cfg: &HopstatConfig) -> anyhow::Result<Ipv4Addr> {
    let resolver = DnsResolver::start(cfg.dns_config())?;
    let addr = resolver
        .lookup_ipv4(&cfg.target)
        .map_err(|err| anyhow!("failed to resolve target: {} ({})", cfg.target, err));
    resolver.cancel();
    addr
}

/// Build a tracer for the target.
fn make_tracer(cfg: &HopstatConfig, target_addr: Ipv4Addr) -> anyhow::Result<Tracer> {
    Ok(Builder::new(IpAddr::V4(target_addr))
        .interface(cfg.interface.clone())
        .source_addr(cfg.source_addr)
        .count(cfg.count)
        .timeout(cfg.timeout)
        .interval(cfg.interval)
        .hop_sleep(cfg.hop_sleep)
        .max_hops(cfg.max_hops)
        .max_unknown_hops(cfg.max_unknown_hops)
        .ring_buffer_size(cfg.ring_buffer_size)
        .reverse_lookup(cfg.ptr_lookup)
        .dns_config(cfg.dns_config())
        .dns_grace_duration(cfg.dns_grace_duration)
        .packet_size(cfg.packet_size)
        .read_timeout(cfg.read_timeout)
        .trace_identifier(cfg.trace_identifier)
        .initial_sequence(cfg.initial_sequence)
        .drop_privileges(true)
        .build()?)
}

/// Cancel the run on Ctrl-C so the partial result is still reported.
fn set_interrupt_handler(tracer: &Tracer) -> anyhow::Result<()> {
    let tracer = tracer.clone();
    ctrlc::set_handler(move || {
        tracing::debug!("interrupted");
        tracer.cancel();
    })
    .context("failed to set Ctrl-C handler")?;
    Ok(())
}

fn configure_logging(cfg: &HopstatConfig) -> anyhow::Result<()> {
    if let Some(subscriber) = make_subscriber(cfg) {
        tracing::subscriber::set_global_default(subscriber)
            .context("failed to install the log subscriber")?;
    }
    Ok(())
}

/// The log subscriber, if verbose logging is enabled.
fn make_subscriber(cfg: &HopstatConfig) -> Option<Box<dyn Subscriber + Send + Sync>> {
    if !cfg.verbose {
        return None;
    }
    let fmt_span = match cfg.log_span_events {
        LogSpanEvents::Off => FmtSpan::NONE,
        LogSpanEvents::Active => FmtSpan::ACTIVE,
        LogSpanEvents::Full => FmtSpan::FULL,
    };
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_span_events(fmt_span)
        .with_env_filter(&cfg.log_filter);
    Some(match cfg.log_format {
        LogFormat::Compact => Box::new(builder.compact().finish()),
        LogFormat::Pretty => Box::new(builder.pretty().finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    })
}

/// Information about a run needed for the reports.
#[derive(Debug, Clone)]
pub struct TraceInfo {
    pub data: Tracer,
    pub target_hostname: String,
    pub start_timestamp: DateTime<Local>,
}

impl TraceInfo {
    #[must_use]
    pub fn new(data: Tracer, target_hostname: String) -> Self {
        Self {
            data,
            target_hostname,
            start_timestamp: Local::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(LogFormat::Compact, LogSpanEvents::Off)]
    #[test_case(LogFormat::Pretty, LogSpanEvents::Active)]
    #[test_case(LogFormat::Json, LogSpanEvents::Full)]
    fn test_make_subscriber(log_format: LogFormat, log_span_events: LogSpanEvents) {
        let cfg = HopstatConfig {
            verbose: true,
            log_format,
            log_span_events,
            ..HopstatConfig::default()
        };
        assert!(make_subscriber(&cfg).is_some());
    }

    #[test]
    fn test_no_subscriber_unless_verbose() {
        assert!(make_subscriber(&HopstatConfig::default()).is_none());
    }
}
