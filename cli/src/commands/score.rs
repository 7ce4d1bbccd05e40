use anyhow::{Context, Result};
use gerryscore::{BoundaryDataProvider, CompactnessReport, Engine, EngineConfig, EngineError};

use crate::cli::{Cli, ScoreArgs};

/// Districts listed at each end of the ranking.
const RANKED: usize = 5;

fn compute<P: BoundaryDataProvider>(engine: &Engine<P>, args: &ScoreArgs) -> Result<CompactnessReport, EngineError> {
    #[cfg(feature = "parallel")]
    return engine.compute_parallel(&args.district_set, !args.basic, args.skip_cache);

    #[cfg(not(feature = "parallel"))]
    engine.compute_district_compactness(&args.district_set, !args.basic, args.skip_cache)
}

pub fn run(cli: &Cli, args: &ScoreArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let data_dir = super::data_dir(&args.source);
    let engine = Engine::new(super::provider(&args.source)?, config);

    println!("[score] scoring {} from {}", args.district_set, data_dir.display());
    let mut report = compute(&engine, args)?;
    print_run(1, &report);
    for run in 2..=args.repeat {
        report = compute(&engine, args)?;
        print_run(run, &report);
    }

    if let Some(out_path) = &args.output {
        println!("[score] writing report to {}", out_path.display());
        let json = serde_json::to_vec_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(out_path, json)
            .with_context(|| format!("Failed to write report to {}", out_path.display()))?;
    } else {
        print_summary(&report);
    }

    if cli.verbose > 0 {
        let stats = engine.cache().stats();
        println!("[score] result cache: {} hits, {} misses", stats.results.hits, stats.results.misses);
        println!("[score] status: {}", serde_json::to_string(&engine.monitor().summary())?);
    }

    Ok(())
}

fn print_run(run: usize, report: &CompactnessReport) {
    println!("[score] run {run} took {}ms{}", report.processing_time_ms,
        if report.cached { " (cached)" } else { "" });
}

fn print_summary(report: &CompactnessReport) {
    let stats = &report.batch.statistics;
    println!("[score] {} districts, mean {:.4}, min {:.4}, max {:.4}, std dev {:.4}",
        stats.total_districts, stats.average_score, stats.min_score, stats.max_score, stats.standard_deviation);

    if let Some(summary) = &report.batch.geographic_summary {
        println!("[score] {} coastal, {} on a border, mean natural boundary {:.2}",
            summary.coastal_districts, summary.border_districts, summary.average_natural_boundary);
    }

    let mut ranked: Vec<(&String, f64)> = report.batch.scores.iter().map(|(id, &score)| (id, score)).collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    println!("[score] least compact:");
    for (id, score) in ranked.iter().take(RANKED) {
        println!("    {id:<24} {score:.4}");
    }
    println!("[score] most compact:");
    for (id, score) in ranked.iter().rev().take(RANKED) {
        println!("    {id:<24} {score:.4}");
    }
}
