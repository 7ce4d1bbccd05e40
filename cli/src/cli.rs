use std::path::PathBuf;

/// District compactness CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "gerryscore", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Score every district of a district set
    Score(ScoreArgs),

    /// Try loading every known district set and report the outcome
    Diagnose(DiagnoseArgs),
}

#[derive(clap::Args, Debug)]
pub struct ScoreArgs {
    /// District set, e.g. congressional-districts, state-upper-districts
    pub district_set: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Raw Polsby-Popper scores only (no boundary adjustment or breakdown)
    #[arg(long)]
    pub basic: bool,

    /// Ignore cached results (the fresh result is still cached)
    #[arg(long)]
    pub skip_cache: bool,

    /// Run the computation this many times
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,

    /// Engine config file (JSON)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Write the report as JSON to this file instead of printing a summary
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DiagnoseArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Where boundary datasets come from.
#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    /// Directory holding the districts/ datasets, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub data: Option<PathBuf>,

    /// Base URL to fetch datasets from when they are missing locally
    #[cfg(feature = "download")]
    #[arg(long, value_hint = clap::ValueHint::Url)]
    pub base_url: Option<String>,
}
