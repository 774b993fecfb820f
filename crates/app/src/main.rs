//! Atrium CLI

use std::process::ExitCode;

use tracing::error;

use crate::cli::Cli;

mod cli;
mod config;
mod observability;

#[tokio::main]
pub async fn main() -> ExitCode {
    let cli = Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, stderr is all that is left"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(%message, "command failed");

            #[expect(clippy::print_stderr, reason = "command errors are shown to the user")]
            {
                eprintln!("{message}");
            }

            ExitCode::FAILURE
        }
    }
}
