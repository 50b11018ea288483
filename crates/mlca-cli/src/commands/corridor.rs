use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mlca_engine::route_options;

use super::{emit_json, resolve_tables};

#[derive(Args, Debug)]
pub struct CorridorArgs {
    /// Origin city.
    #[arg(long)]
    pub origin: String,
    /// Destination city.
    #[arg(long)]
    pub destination: String,
    /// Shipment weight, tonnes.
    #[arg(long)]
    pub weight: f64,
    /// Skip the empty-return uplift for road modes.
    #[arg(long)]
    pub no_empty_return: bool,
    /// Replacement table file.
    #[arg(long)]
    pub tables: Option<PathBuf>,
}

pub fn run(args: &CorridorArgs) -> Result<(), Box<dyn Error>> {
    let tables = resolve_tables(args.tables.as_deref())?;
    let options = route_options(
        &tables,
        &args.origin,
        &args.destination,
        args.weight,
        !args.no_empty_return,
    )?;
    emit_json(&options, None)
}
