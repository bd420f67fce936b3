//! `sstreams verify` - Verify a clearsigned document.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use simplestreams::signing::load_public_key_pem;
use simplestreams::Verifier;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Clearsigned document (e.g. index.sjson)
    pub file: PathBuf,

    /// Public key file (SPKI PEM)
    #[arg(long)]
    pub pubkey: PathBuf,

    /// Quiet mode - only exit code, no output
    #[arg(long, short)]
    pub quiet: bool,
}

pub fn cmd_verify(args: VerifyArgs) -> i32 {
    match verify_file(&args) {
        Ok(plaintext) => {
            if !args.quiet {
                if let Err(e) = std::io::stdout().write_all(&plaintext) {
                    eprintln!("error: failed to write output: {e}");
                    return 1;
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

fn verify_file(args: &VerifyArgs) -> Result<Vec<u8>> {
    let raw = std::fs::read(&args.file)
        .with_context(|| format!("failed to read file: {}", args.file.display()))?;
    let key = load_public_key_pem(&args.pubkey)?;
    Ok(Verifier::new(key).verify(&raw)?)
}
