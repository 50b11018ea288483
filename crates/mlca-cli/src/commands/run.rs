use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use mlca_engine::{ingest_for_path, AggregationConfig, CanonicalJsonStage, Pipeline};

use super::{emit_text, resolve_tables, GwpArg};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file; `.json` is read as JSON, anything else as YAML.
    #[arg(long)]
    pub scenario: PathBuf,
    /// Replacement table file.
    #[arg(long)]
    pub tables: Option<PathBuf>,
    /// GWP-100 revision applied to process gases.
    #[arg(long, value_enum, default_value_t = GwpArg::Ar6)]
    pub gwp: GwpArg,
    /// Decimal places for the summary figures.
    #[arg(long)]
    pub precision: Option<u32>,
    /// Disable the end-of-life recycling credit.
    #[arg(long)]
    pub no_eol_credit: bool,
    /// Timestamp recorded in the result metadata; defaults to now.
    #[arg(long)]
    pub calculated_at: Option<String>,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let tables = resolve_tables(args.tables.as_deref())?;
    let calculated_at = args
        .calculated_at
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339());
    let mut config = AggregationConfig::pinned(args.gwp.into())
        .with_calculated_at(calculated_at)
        .with_eol_credit(!args.no_eol_credit);
    if let Some(digits) = args.precision {
        config = config.with_precision(digits);
    }

    let raw = fs::read(&args.scenario)?;
    let pipeline = Pipeline::new(ingest_for_path(&args.scenario), tables, config);
    let rendered = pipeline.run_with(&raw, &CanonicalJsonStage)?;
    tracing::info!(scenario = %args.scenario.display(), "scenario assessed");
    emit_text(&rendered, args.out.as_ref())
}
