//! Subcommand implementations. Each returns the process exit code.

pub mod validate_images;
pub mod validate_tools;
pub mod verify;

use simplestreams::StreamsError;
use simplestreams_content::ValidationError;

use crate::args::{Cli, Command};

pub async fn dispatch(cli: Cli) -> i32 {
    match cli.cmd {
        Command::ValidateImages(args) => validate_images::cmd_validate_images(args).await,
        Command::ValidateTools(args) => validate_tools::cmd_validate_tools(args).await,
        Command::Verify(args) => verify::cmd_verify(args),
    }
}

/// Exit code carried by a typed error, or 1.
pub(crate) fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<ValidationError>() {
        e.exit_code()
    } else if let Some(e) = err.downcast_ref::<StreamsError>() {
        e.exit_code()
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_from_typed_errors() {
        let err = anyhow::Error::new(ValidationError::MissingParameter { name: "region" });
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::new(StreamsError::NotSigned).context("while verifying");
        assert_eq!(exit_code(&err), 4);

        assert_eq!(exit_code(&anyhow::anyhow!("plain")), 1);
    }
}
