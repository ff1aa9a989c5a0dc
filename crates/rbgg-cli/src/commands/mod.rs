//! CLI command definitions and handlers.

pub mod process;

use clap::Parser;

/// rbgg - remove background gradients from grayscale scans and photos
#[derive(Parser)]
#[command(name = "rbgg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Processing arguments (paths, window, outputs).
    #[command(flatten)]
    pub process: process::ProcessArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every input was flattened.
    Success = 0,
    /// At least one input was skipped.
    PartialFailure = 1,
    /// Nothing could be processed (bad arguments, unusable parameters, I/O).
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
