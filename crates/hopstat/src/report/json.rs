use crate::report::types::Report;
use tracing::instrument;

/// Print a json report of the run.
#[instrument(skip_all, level = "trace")]
pub fn report(report: &Report) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), report)?;
    println!();
    Ok(())
}
