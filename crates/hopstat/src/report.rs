use crate::app::TraceInfo;
use crate::config::Mode;
use types::{Host, Info, Report};

pub mod json;
pub mod table;
mod types;

/// Report the hop table of a finished run in the given output mode.
pub fn report(info: &TraceInfo, mode: Mode) -> anyhow::Result<()> {
    let report = make_report(info);
    match mode {
        Mode::Table => table::report(&report),
        Mode::Json => json::report(&report),
    }
}

fn make_report(info: &TraceInfo) -> Report {
    let result = info.data.result();
    let run_info = Info::new(
        Host {
            ip: Some(result.target_addr),
            hostname: info.target_hostname.clone(),
        },
        info.data.source_addr(),
        info.start_timestamp,
        result.outcome,
        result.rounds,
    );
    Report::new(run_info, &result)
}
