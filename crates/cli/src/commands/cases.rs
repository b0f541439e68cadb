//! List stored test cases

use anyhow::Result;
use clap::Args;

use super::{site_name, Context};
use crate::output::{print_list, CaseDisplay};

#[derive(Args)]
pub struct CasesArgs {
    /// Site whose test cases to list
    #[arg(long, value_parser = site_name)]
    pub site: String,
}

pub async fn execute(args: CasesArgs, ctx: &Context) -> Result<()> {
    let profile = ctx.store().await?.load(&args.site).await?;

    if let Some(credentials) = &profile.login_credentials {
        println!("Login: {}", credentials.email);
    }

    let displays: Vec<CaseDisplay> = profile
        .test_cases
        .iter()
        .enumerate()
        .map(|(i, case)| CaseDisplay { index: i + 1, case })
        .collect();
    print_list(&displays, ctx.format);
    Ok(())
}
