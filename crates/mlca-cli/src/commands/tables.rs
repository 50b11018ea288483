use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mlca_tables::SharedTables;
use serde::Serialize;

use super::emit_json;

#[derive(Args, Debug)]
pub struct TablesArgs {
    /// Replacement table file; summarises the built-in set when omitted.
    #[arg(long)]
    pub tables: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TableSummary {
    version: String,
    content_hash: String,
    metals: Vec<String>,
    grid_presets: Vec<String>,
    transport_modes: Vec<String>,
}

pub fn run(args: &TablesArgs) -> Result<(), Box<dyn Error>> {
    let shared = SharedTables::from_builtin()?;
    let snapshot = match &args.tables {
        Some(path) => shared.reload_from(path)?,
        None => shared.snapshot(),
    };
    let summary = TableSummary {
        version: snapshot.version.clone(),
        content_hash: snapshot.content_hash()?,
        metals: snapshot.metals.keys().cloned().collect(),
        grid_presets: snapshot.grid.presets.keys().cloned().collect(),
        transport_modes: snapshot.transport.modes.keys().cloned().collect(),
    };
    emit_json(&summary, None)
}
