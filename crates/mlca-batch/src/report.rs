use std::collections::BTreeMap;

use chrono::Utc;
use mlca_core::errors::LcaError;
use mlca_core::provenance::RunProvenance;
use mlca_engine::RankedScenario;
use mlca_tables::TableSet;
use serde::{Deserialize, Serialize};

use crate::plan::Plan;
use crate::stat::StatsSummary;

/// State enumeration for a batch scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobState {
    /// Scenario assessed.
    Complete,
    /// Scenario rejected.
    Failed,
}

/// Status of an individual scenario within a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Outcome of the scenario.
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Typed error captured when the scenario fails.
    pub error: Option<LcaError>,
}

impl JobStatus {
    /// Constructs a successful status descriptor.
    pub fn success() -> Self {
        Self {
            state: JobState::Complete,
            error: None,
        }
    }

    /// Constructs a failed status descriptor carrying the error.
    pub fn failed(error: LcaError) -> Self {
        Self {
            state: JobState::Failed,
            error: Some(error),
        }
    }

    /// Returns true when the scenario completed.
    pub fn is_complete(&self) -> bool {
        self.state == JobState::Complete
    }
}

/// Canonical report entry for a single scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Execution status.
    pub status: JobStatus,
    /// Hash of the scenario definition.
    pub input_hash: String,
    /// Hash of the canonical result, when one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_hash: Option<String>,
    /// Net total, kg CO2e.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_net_emissions_kg_co2e: Option<f64>,
    /// kg CO2e per kg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission_intensity_kg_co2e_per_kg: Option<f64>,
    /// Number of data-quality warnings raised.
    pub warning_count: usize,
}

/// Ranking of the successful scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchRanking {
    /// Ascending by net total, ties by name.
    pub entries: Vec<RankedScenario>,
    /// Lowest net total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best: Option<String>,
    /// Highest net total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst: Option<String>,
    /// `worst − best`, kg CO2e.
    pub reduction_kg_co2e: f64,
    /// Reduction relative to the worst total, percent.
    pub reduction_pct: f64,
}

/// Deterministic batch report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Plan label.
    pub plan_name: String,
    /// Canonical hash of the plan driving the run.
    pub plan_hash: String,
    /// Per-scenario results in plan order.
    pub scenarios: Vec<ScenarioReport>,
    /// Ranking of successful scenarios.
    pub ranking: BatchRanking,
    /// Cross-scenario statistics.
    pub stats: StatsSummary,
    /// Provenance metadata describing the run.
    pub provenance: RunProvenance,
}

impl BatchReport {
    /// Constructs a new report from its constituent parts.
    pub fn new(
        plan: &Plan,
        tables: &TableSet,
        scenarios: Vec<ScenarioReport>,
        ranking: BatchRanking,
        stats: StatsSummary,
    ) -> Result<Self, LcaError> {
        let plan_hash = plan.plan_hash()?;
        Ok(Self {
            plan_name: plan.name.clone(),
            provenance: provenance(&plan_hash, tables)?,
            plan_hash,
            scenarios,
            ranking,
            stats,
        })
    }

    /// Number of failed scenarios.
    pub fn failed_count(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|scenario| !scenario.status.is_complete())
            .count()
    }
}

fn provenance(plan_hash: &str, tables: &TableSet) -> Result<RunProvenance, LcaError> {
    let mut versions = BTreeMap::new();
    versions.insert(
        "mlca-batch".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    Ok(RunProvenance {
        schema: Default::default(),
        input_hash: plan_hash.to_string(),
        table_version: tables.version.clone(),
        table_hash: tables.content_hash()?,
        created_at: Utc::now().to_rfc3339(),
        tool_versions: versions,
    })
}
