#![deny(missing_docs)]
#![doc = "Batch execution of metal LCA scenario plans with per-scenario status, canonical reports and ranking export."]

/// Parallel plan execution.
pub mod dispatch;
/// CSV export of rankings.
pub mod export;
/// Plan loading and normalisation.
pub mod plan;
/// Report assembly.
pub mod report;
/// Cross-scenario statistics.
pub mod stat;

pub use dispatch::{plan_tables, run_plan, run_plan_from_path, RunOpts, RANKING_FILE, REPORT_FILE};
pub use export::write_ranking_csv;
pub use plan::{load_plan, OutputSpec, Plan, PlannedScenario};
pub use report::{BatchRanking, BatchReport, JobState, JobStatus, ScenarioReport};
pub use stat::{Quantiles, StatsSummary};
