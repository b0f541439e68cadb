//! Replay stored test cases once

use anyhow::Result;
use autotest_engine::{ReplayEngine, ReplaySummary};
use clap::Args;
use std::time::Instant;

use super::{site_name, Context};
use crate::output::{print_error, print_item, print_list, print_success, print_warning};

#[derive(Args)]
pub struct RunArgs {
    /// Site whose test cases to replay
    #[arg(long, value_parser = site_name)]
    pub site: String,
}

pub async fn execute(args: RunArgs, ctx: &Context) -> Result<()> {
    let engine = ReplayEngine::new(ctx.store().await?, ctx.launcher(), ctx.config.engine_config());

    let start = Instant::now();
    let rows = engine.replay(&args.site).await?;

    if rows.is_empty() {
        print_warning(&format!("No test cases to run for '{}'", args.site));
        return Ok(());
    }

    let summary = ReplaySummary::from_rows(&args.site, &rows, start.elapsed().as_millis() as u64);
    print_list(&rows, ctx.format);
    print_item(&summary, ctx.format);

    let report = engine.store().report_path(&args.site)?;
    if summary.success() {
        print_success(&format!("All {} test case(s) passed; report at {}", summary.total, report.display()));
    } else {
        print_error(&format!(
            "{} of {} test case(s) failed; report at {}",
            summary.failed,
            summary.total,
            report.display()
        ));
        std::process::exit(1);
    }
    Ok(())
}
