use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use mlca_core::serde::from_yaml_slice;
use mlca_engine::{compare_circularity, MaterialEmissionFactors, RecyclingParams};

use super::{emit_json, resolve_tables};

#[derive(Args, Debug)]
pub struct CircularityArgs {
    /// Metal name or alias.
    #[arg(long)]
    pub metal: String,
    /// Product type selecting the lifetime.
    #[arg(long)]
    pub product: Option<String>,
    /// Collection region scaling the preset collection rate.
    #[arg(long)]
    pub region: Option<String>,
    /// YAML map of strategy name to recycling parameters.
    #[arg(long)]
    pub strategies: PathBuf,
    /// Replacement table file.
    #[arg(long)]
    pub tables: Option<PathBuf>,
}

pub fn run(args: &CircularityArgs) -> Result<(), Box<dyn Error>> {
    let tables = resolve_tables(args.tables.as_deref())?;
    let raw = fs::read(&args.strategies)?;
    let strategies: BTreeMap<String, RecyclingParams> = from_yaml_slice(&raw)?;
    let comparison = compare_circularity(
        &tables,
        &args.metal,
        args.product.as_deref(),
        &strategies,
        args.region.as_deref(),
        &MaterialEmissionFactors::default(),
    )?;
    emit_json(&comparison, None)
}
