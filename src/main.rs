//! Entry point for the translation-store command.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use translation_store::cli::{
    self,
    Cli,
};

/// Runs one command and maps its outcome to the process exit code.
#[tokio::main]
#[allow(clippy::print_stdout)]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .init();

    match cli::run(Cli::parse()).await {
        Ok(output) => {
            println!("{output:#}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::from(error.exit_code())
        }
    }
}
