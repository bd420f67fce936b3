//! `sstreams validate-tools` - List usable tools versions.

use anyhow::Result;
use clap::Args;
use simplestreams_content::validate_tools_metadata;

use crate::args::LookupArgs;

#[derive(Args, Debug)]
pub struct ValidateToolsArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Tools version to look for; any version when omitted
    #[arg(long = "tools-version")]
    pub version: Option<String>,

    /// Quiet mode - only exit code, no output
    #[arg(long, short)]
    pub quiet: bool,
}

pub async fn cmd_validate_tools(args: ValidateToolsArgs) -> i32 {
    match run_validate_tools(&args).await {
        Ok(versions) => {
            if !args.quiet {
                for version in versions {
                    println!("{version}");
                }
            }
            0
        }
        Err(e) => {
            if !args.quiet {
                eprintln!("error: {e:#}");
            }
            super::exit_code(&e)
        }
    }
}

async fn run_validate_tools(args: &ValidateToolsArgs) -> Result<Vec<String>> {
    let params = args.lookup.lookup_params()?;
    let fetcher = params.config.fetcher()?;
    let verifier = params.config.load_verifier()?;
    Ok(validate_tools_metadata(&fetcher, &params, args.version.as_deref(), &verifier).await?)
}
