#![deny(missing_docs)]
#![doc = "Versioned, immutable constant tables for the metal LCA engine, shipped as a YAML resource and embedded as the built-in default."]

/// Loading, validation and memoisation of table sets.
pub mod load;
/// Typed table model.
pub mod model;
/// Snapshot holder supporting hot reload.
pub mod shared;

pub use load::{builtin_tables, load_tables, parse_tables, BUILTIN_TABLES_YAML};
pub use model::{
    CircularityWeights, Corridor, GradeThreshold, GridTables, GwpVersion, ImpactFactors,
    LogisticsStage, MaterialFactors, MetalRecycling, MetalTables, ModeCategory, ProcessEntry,
    RecyclingTables, RouteLogistics, TableSet, TransportMode, TransportTables, UncertaintyTables, UseLossModel,
};
pub use shared::SharedTables;
