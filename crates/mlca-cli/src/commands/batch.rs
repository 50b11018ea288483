use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mlca_batch::{run_plan_from_path, RunOpts};

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Plan YAML listing named scenarios.
    #[arg(long)]
    pub plan: PathBuf,
    /// Output directory for the report and per-scenario artefacts.
    #[arg(long)]
    pub out: PathBuf,
    /// Number of scenarios assessed in parallel.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

pub fn run(args: &BatchArgs) -> Result<(), Box<dyn Error>> {
    let opts = RunOpts {
        concurrency: args.concurrency,
    };
    let report = run_plan_from_path(&args.plan, &args.out, &opts)?;
    println!(
        "{}: {} scenarios, {} failed, best {}",
        report.plan_name,
        report.scenarios.len(),
        report.failed_count(),
        report.ranking.best.as_deref().unwrap_or("-"),
    );
    Ok(())
}
