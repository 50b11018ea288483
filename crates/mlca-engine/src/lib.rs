#![deny(missing_docs)]
#![doc = "Deterministic life-cycle assessment calculators for aluminum and copper: GWP conversion, grid factors, process and transport emissions, recycling credits and whole-scenario aggregation."]

/// Rule-based improvement suggestions shared by the calculators.
pub mod advice;
/// Whole-scenario aggregation.
pub mod aggregate;
/// Parallel comparison of named scenarios.
pub mod compare;
/// Per-call aggregation settings.
pub mod config;
/// Electricity-mix grid factors.
pub mod grid;
/// GWP-100 conversion.
pub mod gwp;
/// Impact-category proxies.
pub mod impact;
/// Ingest and result-stage composition.
pub mod pipeline;
/// Process and route emissions.
pub mod process;
/// Recycling and circularity.
pub mod recycling;
/// Scenario input model.
pub mod scenario;
/// Freight emissions.
pub mod transport;
/// Uncertainty propagation.
pub mod uncertainty;

pub use advice::{Priority, Recommendation};
pub use aggregate::{
    aggregate, EmissionSourceBreakdown, EnergyAnalysis, Hotspot, Kpis, LcaMetadata, LcaResult,
    ProductionEmissions, RouteBenefit,
};
pub use compare::{compare_scenarios, rank_outcomes, RankedScenario, ScenarioComparison, ScenarioOutcome};
pub use config::{AggregationConfig, ImpactMethod};
pub use grid::{compare_mixes, compare_presets, grid_factor, ElectricityMix, GridFactorReport, MixComparison};
pub use gwp::{co2e, GasAmount};
pub use impact::ImpactCategories;
pub use pipeline::{
    ingest_for_path, CanonicalJsonStage, JsonIngest, Pipeline, ResultStage, ScenarioIngest,
    YamlIngest,
};
pub use process::{
    chain_emissions, compare_primary_secondary, energy_intensity_sensitivity, process_emissions,
    ChainEmissions, ProcessEmissions, ProcessOverride, ProcessSpec, RouteComparison, Sensitivity,
};
pub use recycling::{
    circularity_metrics, compare_circularity, end_of_life_scenarios, CircularityMetrics,
    EolScenario, MaterialEmissionFactors, RecyclingParams,
};
pub use scenario::{AnalysisType, Scenario};
pub use transport::{
    compare_modes, multimodal, route_logistics, route_options, transport_emissions, LegEmissions,
    LogisticsOptions, ModeComparison, MultimodalEmissions, RouteKind, TransportLeg,
};
pub use uncertainty::UncertaintyAnalysis;
