//! DREAM SMC submission processing main executable

pub mod common;
pub mod conf;
pub mod convert;
pub mod err;
pub mod preprocess;
pub mod split;
pub mod submission;
pub mod validate;

use clap::{Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "DREAM SMC submission processing",
    long_about = "This tool validates, splits, and converts somatic mutation call submissions to VCF"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a submission file.
    Validate(validate::Args),
    /// Split a multi-sample submission file by sample.
    Split(split::Args),
    /// Convert a single-sample submission file to VCF.
    Convert(convert::Args),
    /// Split a submission file and convert each sample to VCF.
    Preprocess(preprocess::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        tracing::debug!("dream-vcf version {}", common::worker_version());
        match &cli.command {
            Commands::Validate(args) => validate::run(&cli.common, args)?,
            Commands::Split(args) => split::run(&cli.common, args)?,
            Commands::Convert(args) => convert::run(&cli.common, args)?,
            Commands::Preprocess(args) => preprocess::run(&cli.common, args)?,
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
