use crate::report::types::{Report, TIME_FORMAT};
use comfy_table::presets::NOTHING;
use comfy_table::{ContentArrangement, Table};
use std::fmt::Write;
use tracing::instrument;

/// Print a table report of the run.
#[instrument(skip_all, level = "trace")]
pub fn report(report: &Report) -> anyhow::Result<()> {
    print!("{}", render(report)?);
    Ok(())
}

/// Render the report header followed by one table row per hop.
pub fn render(report: &Report) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "Start Time: {}",
        report.info.start_timestamp.format(TIME_FORMAT)
    )?;
    writeln!(out, "Target: {}", report.info.target.hostname)?;
    writeln!(
        out,
        "Source IP: {}",
        report
            .info
            .source
            .map_or_else(|| String::from("???"), |addr| addr.to_string())
    )?;
    writeln!(
        out,
        "Destination IP: {}",
        report
            .info
            .target
            .ip
            .map_or_else(|| String::from("???"), |addr| addr.to_string())
    )?;
    writeln!(out)?;
    let columns = vec![
        "HOP", "Address", "Loss(%)", "Lost", "Sent", "Last", "Avg", "Best", "Worst",
    ];
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(columns);
    for hop in &report.hops {
        let ttl = hop.ttl.to_string();
        let host = hop.host.to_string();
        let loss_pct = format!("{:.1}", hop.loss_pct);
        let lost = hop.lost.to_string();
        let sent = hop.sent.to_string();
        let last = format_ms(hop.last);
        let avg = format_ms(hop.avg);
        let best = format_ms(hop.best);
        let worst = format_ms(hop.worst);
        table.add_row(vec![
            &ttl, &host, &loss_pct, &lost, &sent, &last, &avg, &best, &worst,
        ]);
    }
    writeln!(out, "{table}")?;
    writeln!(out)?;
    writeln!(out, "Result: {}", report.info.outcome)?;
    Ok(out)
}

fn format_ms(value: Option<f64>) -> String {
    value.map_or_else(|| String::from("???"), |ms| format!("{ms:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{Host, Info};
    use chrono::{Local, TimeZone};
    use hopstat_core::{HopResult, HopStatus, RunOutcome, RunResult};
    use std::net::IpAddr;
    use std::time::Duration;

    #[test]
    fn test_render() {
        let rendered = render(&report()).unwrap();
        let lines = rendered.lines().collect::<Vec<_>>();
        assert!(lines[0].starts_with("Start Time: 2025-03-01 12:30:45 "));
        assert_eq!("Target: example.com", lines[1]);
        assert_eq!("Source IP: 192.168.1.10", lines[2]);
        assert_eq!("Destination IP: 93.184.216.34", lines[3]);
        assert_eq!("", lines[4]);
        let header = lines[5].split_whitespace().collect::<Vec<_>>();
        assert_eq!(
            vec!["HOP", "Address", "Loss(%)", "Lost", "Sent", "Last", "Avg", "Best", "Worst"],
            header
        );
        let rows = lines
            .iter()
            .map(|line| line.split_whitespace().collect::<Vec<_>>())
            .filter(|cells| cells.len() == 9 && cells[0] != "HOP")
            .collect::<Vec<_>>();
        assert_eq!(3, rows.len());
        assert_eq!(
            vec!["1", "gw.example.com", "0.0", "0", "5", "1.2", "1.5", "1.0", "2.0"],
            rows[0]
        );
        assert_eq!(
            vec!["2", "???", "100.0", "5", "5", "???", "???", "???", "???"],
            rows[1]
        );
        assert_eq!(
            vec!["3", "93.184.216.34", "20.0", "1", "5", "10.0", "11.0", "9.5", "12.5"],
            rows[2]
        );
        assert_eq!(Some(&"Result: destination reached"), lines.last());
    }

    fn report() -> Report {
        let start = Local.with_ymd_and_hms(2025, 3, 1, 12, 30, 45).unwrap();
        let target = IpAddr::from([93, 184, 216, 34]);
        let result = RunResult {
            target_addr: target,
            outcome: Some(RunOutcome::DestinationReached),
            rounds: 5,
            hops: vec![
                hop(
                    1,
                    Some(IpAddr::from([192, 168, 1, 1])),
                    Some("gw.example.com"),
                    0,
                    [1200, 1500, 1000, 2000],
                ),
                HopResult {
                    ttl: 2,
                    addr: None,
                    hostname: None,
                    status: HopStatus::Unknown,
                    sent: 5,
                    lost: 5,
                    loss_pct: 100.0,
                    last: None,
                    avg: None,
                    best: None,
                    worst: None,
                },
                hop(3, Some(target), None, 1, [10000, 11000, 9500, 12500]),
            ],
        };
        let info = Info::new(
            Host {
                ip: Some(target),
                hostname: String::from("example.com"),
            },
            Some(IpAddr::from([192, 168, 1, 10])),
            start,
            result.outcome,
            result.rounds,
        );
        Report::new(info, &result)
    }

    fn hop(
        ttl: u8,
        addr: Option<IpAddr>,
        hostname: Option<&str>,
        lost: usize,
        [last, avg, best, worst]: [u64; 4],
    ) -> HopResult {
        HopResult {
            ttl,
            addr,
            hostname: hostname.map(String::from),
            status: HopStatus::Responding,
            sent: 5,
            lost,
            loss_pct: lost as f64 / 5.0 * 100.0,
            last: Some(Duration::from_micros(last)),
            avg: Some(Duration::from_micros(avg)),
            best: Some(Duration::from_micros(best)),
            worst: Some(Duration::from_micros(worst)),
        }
    }
}
