use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mlca_engine::compare_presets;

use super::{emit_json, resolve_tables};

#[derive(Args, Debug)]
pub struct GridArgs {
    /// Baseline grid preset.
    #[arg(long, default_value = "current_2024")]
    pub base: String,
    /// Target grid preset.
    #[arg(long)]
    pub target: String,
    /// Replacement table file.
    #[arg(long)]
    pub tables: Option<PathBuf>,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &GridArgs) -> Result<(), Box<dyn Error>> {
    let tables = resolve_tables(args.tables.as_deref())?;
    let comparison = compare_presets(&tables, &args.base, &args.target)?;
    emit_json(&comparison, args.out.as_ref())
}
