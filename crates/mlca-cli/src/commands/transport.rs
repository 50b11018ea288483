use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mlca_engine::compare_modes;

use super::{emit_json, resolve_tables};

#[derive(Args, Debug)]
pub struct TransportArgs {
    /// Shipment weight, tonnes.
    #[arg(long)]
    pub weight: f64,
    /// Distance, km.
    #[arg(long)]
    pub distance: f64,
    /// Candidate modes.
    #[arg(long, value_delimiter = ',', required = true)]
    pub modes: Vec<String>,
    /// Skip the empty-return uplift for road modes.
    #[arg(long)]
    pub no_empty_return: bool,
    /// Replacement table file.
    #[arg(long)]
    pub tables: Option<PathBuf>,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &TransportArgs) -> Result<(), Box<dyn Error>> {
    let tables = resolve_tables(args.tables.as_deref())?;
    let comparison = compare_modes(
        &tables,
        args.weight,
        args.distance,
        &args.modes,
        !args.no_empty_return,
    )?;
    emit_json(&comparison, args.out.as_ref())
}
