use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use simplestreams::StreamsConfig;
use simplestreams_content::MetadataLookupParams;

#[derive(Parser, Debug)]
#[command(
    name = "sstreams",
    version,
    about = "Validate simplestreams image and tools metadata"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List image ids usable for a cloud, series and architectures
    ValidateImages(super::commands::validate_images::ValidateImagesArgs),
    /// List tools versions usable for a cloud, series and architectures
    ValidateTools(super::commands::validate_tools::ValidateToolsArgs),
    /// Verify a clearsigned document and print its contents
    Verify(super::commands::verify::VerifyArgs),
}

/// Where to look and what to look for.
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Cloud region, e.g. us-east-1
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Cloud endpoint URL
    #[arg(long, short = 'u')]
    pub endpoint: Option<String>,

    /// Series to look up
    #[arg(long, short = 's', default_value = "precise")]
    pub series: String,

    /// Architectures in order of preference (comma separated)
    #[arg(long = "arch", short = 'a', value_delimiter = ',', default_value = "amd64")]
    pub arches: Vec<String>,

    /// Base URLs tried in order (comma separated); overrides config
    #[arg(long = "base-url", short = 'd', value_delimiter = ',')]
    pub base_urls: Vec<String>,

    /// Index path relative to each base URL, without suffix
    #[arg(long)]
    pub index_path: Option<String>,

    /// Reject unsigned metadata
    #[arg(long)]
    pub require_signed: bool,

    /// Public key file (SPKI PEM) used to verify signed metadata
    #[arg(long)]
    pub pubkey: Option<PathBuf>,

    /// Config file (YAML); defaults to SIMPLESTREAMS_* environment variables
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl LookupArgs {
    /// Config file or environment, then flags on top.
    pub fn streams_config(&self) -> Result<StreamsConfig> {
        let mut config = match &self.config {
            Some(path) => StreamsConfig::from_yaml_file(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
            None => StreamsConfig::from_env(),
        };

        if !self.base_urls.is_empty() {
            config = config.with_base_urls(self.base_urls.iter().cloned());
        }
        if let Some(index_path) = &self.index_path {
            config = config.with_index_path(index_path.clone());
        }
        if self.require_signed {
            config = config.with_require_signed(true);
        }
        if let Some(pubkey) = &self.pubkey {
            config = config.with_signing_key_path(pubkey.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout_secs(timeout);
        }
        Ok(config)
    }

    pub fn lookup_params(&self) -> Result<MetadataLookupParams> {
        Ok(MetadataLookupParams {
            region: self.region.clone().unwrap_or_default(),
            endpoint: self.endpoint.clone().unwrap_or_default(),
            series: self.series.clone(),
            architectures: self.arches.clone(),
            config: self.streams_config()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_args(cli: Cli) -> LookupArgs {
        match cli.cmd {
            Command::ValidateImages(args) => args.lookup,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("streams.yaml");
        std::fs::write(
            &config_path,
            "base_urls: [\"https://from-file\"]\nindex_path: custom/index\ntimeout_secs: 7\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "sstreams",
            "validate-images",
            "--config",
            config_path.to_str().unwrap(),
            "-r",
            "us-east-1",
            "-u",
            "https://ec2.us-east-1.amazonaws.com",
            "--arch",
            "amd64,arm",
            "--base-url",
            "https://a,https://b",
            "--require-signed",
        ])
        .unwrap();

        let params = lookup_args(cli).lookup_params().unwrap();
        assert_eq!(params.region, "us-east-1");
        assert_eq!(params.series, "precise");
        assert_eq!(params.architectures, vec!["amd64", "arm"]);
        assert_eq!(params.config.base_urls, vec!["https://a", "https://b"]);
        assert_eq!(params.config.index_path, "custom/index");
        assert_eq!(params.config.timeout_secs, 7);
        assert!(params.config.require_signed);
    }

    #[test]
    fn test_config_file_values_kept_without_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("streams.yaml");
        std::fs::write(&config_path, "base_urls: [\"https://from-file\"]\n").unwrap();

        let cli = Cli::try_parse_from([
            "sstreams",
            "validate-images",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        let params = lookup_args(cli).lookup_params().unwrap();
        assert_eq!(params.config.base_urls, vec!["https://from-file"]);
        assert_eq!(params.region, "");
        assert!(!params.config.require_signed);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli::try_parse_from([
            "sstreams",
            "validate-images",
            "--config",
            "/nonexistent/streams.yaml",
        ])
        .unwrap();
        assert!(lookup_args(cli).streams_config().is_err());
    }
}
