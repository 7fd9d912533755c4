use chrono::{DateTime, Local};
use hopstat_core::{HopResult, HopStatus, RunOutcome, RunResult};
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::time::Duration;

/// The format of the start and end times in a report.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Serialize)]
pub struct Report {
    pub info: Info,
    pub hops: Vec<Hop>,
}

impl Report {
    pub fn new(info: Info, result: &RunResult) -> Self {
        Self {
            info,
            hops: result.hops.iter().map(Hop::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Info {
    pub target: Host,
    pub source: Option<IpAddr>,
    pub start_timestamp: DateTime<Local>,
    pub end_timestamp: DateTime<Local>,
    pub outcome: String,
    pub rounds: usize,
}

impl Info {
    pub fn new(
        target: Host,
        source: Option<IpAddr>,
        start_timestamp: DateTime<Local>,
        outcome: Option<RunOutcome>,
        rounds: usize,
    ) -> Self {
        Self {
            target,
            source,
            start_timestamp,
            end_timestamp: Local::now(),
            outcome: outcome.map_or_else(|| String::from("running"), |outcome| outcome.to_string()),
            rounds,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Host {
    pub ip: Option<IpAddr>,
    pub hostname: String,
}

impl Display for Host {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.ip, self.hostname.is_empty()) {
            (_, false) => write!(f, "{}", self.hostname),
            (Some(ip), true) => write!(f, "{ip}"),
            (None, true) => write!(f, "???"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Hop {
    pub ttl: u8,
    pub host: Host,
    pub status: Status,
    pub sent: usize,
    pub lost: usize,
    #[serde(serialize_with = "fixed_width")]
    pub loss_pct: f64,
    #[serde(serialize_with = "fixed_width_opt")]
    pub last: Option<f64>,
    #[serde(serialize_with = "fixed_width_opt")]
    pub avg: Option<f64>,
    #[serde(serialize_with = "fixed_width_opt")]
    pub best: Option<f64>,
    #[serde(serialize_with = "fixed_width_opt")]
    pub worst: Option<f64>,
}

impl From<&HopResult> for Hop {
    fn from(value: &HopResult) -> Self {
        Self {
            ttl: value.ttl,
            host: Host {
                ip: value.addr,
                hostname: value.hostname.clone().unwrap_or_default(),
            },
            status: Status::from(value.status),
            sent: value.sent,
            lost: value.lost,
            loss_pct: value.loss_pct,
            last: value.last.map(as_ms),
            avg: value.avg.map(as_ms),
            best: value.best.map(as_ms),
            worst: value.worst.map(as_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Unknown,
    Responding,
    DestinationReached,
}

impl From<HopStatus> for Status {
    fn from(value: HopStatus) -> Self {
        match value {
            HopStatus::Unknown => Self::Unknown,
            HopStatus::Responding => Self::Responding,
            HopStatus::DestinationReached => Self::DestinationReached,
        }
    }
}

fn as_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000_f64
}

#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn fixed_width<S>(val: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{val:.2}"))
}

pub fn fixed_width_opt<S>(val: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match val {
        Some(val) => fixed_width(val, serializer),
        None => serializer.serialize_none(),
    }
}
