//! `sstreams validate-images` - List usable image ids.

use anyhow::Result;
use clap::Args;
use simplestreams_content::validate_image_metadata;

use crate::args::LookupArgs;

#[derive(Args, Debug)]
pub struct ValidateImagesArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Quiet mode - only exit code, no output
    #[arg(long, short)]
    pub quiet: bool,
}

pub async fn cmd_validate_images(args: ValidateImagesArgs) -> i32 {
    match run_validate_images(&args).await {
        Ok(ids) => {
            if !args.quiet {
                for id in ids {
                    println!("{id}");
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

async fn run_validate_images(args: &ValidateImagesArgs) -> Result<Vec<String>> {
    let params = args.lookup.lookup_params()?;
    let fetcher = params.config.fetcher()?;
    let verifier = params.config.load_verifier()?;
    Ok(validate_image_metadata(&fetcher, &params, &verifier).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplestreams::testing::{IMAGE_METADATA_V1, INDEX_V1};

    fn args(base_url: &str) -> ValidateImagesArgs {
        ValidateImagesArgs {
            lookup: LookupArgs {
                region: Some("us-east-1".to_string()),
                endpoint: Some("https://ec2.us-east-1.amazonaws.com".to_string()),
                series: "precise".to_string(),
                arches: vec!["arm".to_string()],
                base_urls: vec![base_url.to_string()],
                index_path: None,
                require_signed: false,
                pubkey: None,
                config: None,
                timeout: None,
            },
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_validate_images_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let streams = dir.path().join("streams/v1");
        std::fs::create_dir_all(&streams).unwrap();
        std::fs::write(streams.join("index.json"), INDEX_V1).unwrap();
        std::fs::write(streams.join("image_metadata.json"), IMAGE_METADATA_V1).unwrap();

        let ids = run_validate_images(&args(dir.path().to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(ids, vec!["ami-442ea699"]);
    }

    #[tokio::test]
    async fn test_missing_region_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path().to_str().unwrap());
        args.lookup.region = None;
        assert_eq!(cmd_validate_images(args).await, 2);
    }

    #[tokio::test]
    async fn test_empty_directory_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cmd_validate_images(args(dir.path().to_str().unwrap())).await, 1);
    }
}
