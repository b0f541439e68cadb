//! Replay stored test cases on an interval

use anyhow::Result;
use autotest_engine::{ReplayEngine, Scheduler};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::{site_name, Context};
use crate::output::print_success;

#[derive(Args)]
pub struct ScheduleArgs {
    /// Site whose test cases to replay
    #[arg(long, value_parser = site_name)]
    pub site: String,

    /// Seconds between the end of one pass and the start of the next
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

pub async fn execute(args: ScheduleArgs, ctx: &Context) -> Result<()> {
    let engine = Arc::new(ReplayEngine::new(
        ctx.store().await?,
        ctx.launcher(),
        ctx.config.engine_config(),
    ));

    let handle = Scheduler::spawn(engine, args.site.clone(), Duration::from_secs(args.interval));
    info!("Press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Stopping; a pass in progress will finish first");

    let passes = handle.stop().await;
    print_success(&format!(
        "Stopped schedule for '{}' after {} completed pass(es)",
        args.site, passes
    ));
    Ok(())
}
