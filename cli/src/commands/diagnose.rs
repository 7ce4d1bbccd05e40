use anyhow::Result;
use gerryscore::{DistrictSet, Engine, EngineConfig};

use crate::cli::{Cli, DiagnoseArgs};

pub fn run(cli: &Cli, args: &DiagnoseArgs) -> Result<()> {
    let data_dir = super::data_dir(&args.source);
    let engine = Engine::new(super::provider(&args.source)?, EngineConfig::default());

    println!("[diagnose] loading district sets from {}", data_dir.display());
    let mut failures = 0;
    for set in DistrictSet::ALL {
        let diagnosis = engine.diagnose(set);
        match &diagnosis.error {
            None => println!("[diagnose] {set}: ok, {} features in {}ms",
                diagnosis.feature_count, diagnosis.load_time_ms),
            Some(error) => {
                failures += 1;
                println!("[diagnose] {set}: FAILED after {}ms: {error}", diagnosis.load_time_ms);
            }
        }
        if cli.verbose > 1 {
            println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} district sets failed to load", DistrictSet::ALL.len());
    }
    Ok(())
}
