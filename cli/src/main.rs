mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{diagnose, score};

/// Log to stderr; RUST_LOG wins over the -v count.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Score(args) => score::run(&cli, args),
        Commands::Diagnose(args) => diagnose::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
