//! AutoTest CLI - Main Entry Point
//!
//! Records clickable elements of live web pages as test cases and replays
//! them, once or on a schedule, writing a pass/fail report per site.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{cases, generate, report, run, schedule, Context};
use config::AutotestConfig;

/// AutoTest - record/replay regression testing for live web pages
#[derive(Parser)]
#[command(name = "autotest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "AUTOTEST_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory for test-case and report files
    #[arg(long, env = "AUTOTEST_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long, env = "AUTOTEST_WEBDRIVER_URL", global = true)]
    webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long, global = true)]
    headless: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record test cases from one or more pages
    Generate(generate::GenerateArgs),

    /// Replay a site's test cases once
    Run(run::RunArgs),

    /// Replay a site's test cases repeatedly until Ctrl-C
    Schedule(schedule::ScheduleArgs),

    /// List a site's stored test cases
    Cases(cases::CasesArgs),

    /// Show a site's replay report
    Report(report::ReportArgs),
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<AutotestConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(autotest_common::default_config_path);
        let mut config = AutotestConfig::load(&path)?;

        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver.url = url.clone();
        }
        if self.headless {
            config.webdriver.headless = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context {
        config: cli.load_config()?,
        format: cli.format,
    };

    match cli.command {
        Commands::Generate(args) => generate::execute(args, &ctx).await?,
        Commands::Run(args) => run::execute(args, &ctx).await?,
        Commands::Schedule(args) => schedule::execute(args, &ctx).await?,
        Commands::Cases(args) => cases::execute(args, &ctx).await?,
        Commands::Report(args) => report::execute(args, &ctx).await?,
    }

    Ok(())
}
