//! Show the replay report of a site

use anyhow::Result;
use autotest_common::{ReportRow, Status};
use chrono::NaiveDate;
use clap::Args;

use super::{site_name, Context};
use crate::output::print_list;

#[derive(Args)]
pub struct ReportArgs {
    /// Site whose report to show
    #[arg(long, value_parser = site_name)]
    pub site: String,

    /// Only rows on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Only failed rows
    #[arg(long)]
    pub failed: bool,

    /// Show at most the last N matching rows
    #[arg(long)]
    pub tail: Option<usize>,
}

impl ReportArgs {
    fn filter(&self, rows: Vec<ReportRow>) -> Vec<ReportRow> {
        let mut rows: Vec<ReportRow> = rows
            .into_iter()
            .filter(|row| self.since.map_or(true, |since| row.date >= since))
            .filter(|row| !self.failed || row.status == Status::Fail)
            .collect();

        if let Some(n) = self.tail {
            let skip = rows.len().saturating_sub(n);
            rows.drain(..skip);
        }
        rows
    }
}

pub async fn execute(args: ReportArgs, ctx: &Context) -> Result<()> {
    let sink = ctx.store().await?.report_sink(&args.site)?;
    let rows = args.filter(sink.read_all().await?);
    print_list(&rows, ctx.format);
    Ok(())
}
