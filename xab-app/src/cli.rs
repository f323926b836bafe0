use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xab", version, about = "Run and check XAB discrimination trials")]
pub struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run every trial in a timeline and write one JSON result per line
    Run(RunArgs),
    /// Print the trial parameter schema as JSON
    Info,
    /// Check that every trial in a timeline is valid
    Validate {
        /// Timeline file (JSON array of trial configs)
        timeline: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Timeline file (JSON array of trial configs)
    pub timeline: PathBuf,

    /// Scripted key presses: a JSON array with one list of presses per trial
    #[arg(short, long)]
    pub responses: Option<PathBuf>,

    /// Wait in real time instead of on a virtual clock
    #[arg(long)]
    pub realtime: bool,

    /// Seed for the left/right coin flip
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write results here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
