use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    batch::{self, BatchArgs},
    circularity::{self, CircularityArgs},
    corridor::{self, CorridorArgs},
    grid::{self, GridArgs},
    run::{self, RunArgs},
    tables::{self, TablesArgs},
    transport::{self, TransportArgs},
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "mlca", about = "Metal life-cycle carbon assessment CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assess a single scenario file and emit the canonical result.
    Run(RunArgs),
    /// Execute a plan of named scenarios in parallel.
    Batch(BatchArgs),
    /// Compare two grid presets.
    Grid(GridArgs),
    /// Compare freight modes for one shipment.
    Transport(TransportArgs),
    /// Price the tabulated modes of a freight corridor.
    Corridor(CorridorArgs),
    /// Compare circularity across end-of-life strategies.
    Circularity(CircularityArgs),
    /// Summarise the active table set.
    Tables(TablesArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Batch(args) => batch::run(&args),
        Command::Grid(args) => grid::run(&args),
        Command::Transport(args) => transport::run(&args),
        Command::Corridor(args) => corridor::run(&args),
        Command::Circularity(args) => circularity::run(&args),
        Command::Tables(args) => tables::run(&args),
    }
}
