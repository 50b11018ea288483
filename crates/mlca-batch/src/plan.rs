use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use mlca_core::errors::{io_error, ErrorInfo, LcaError};
use mlca_core::hash::stable_hash_string;
use mlca_core::serde::{from_yaml_slice, to_yaml_string};
use mlca_engine::{AggregationConfig, Scenario};
use serde::{Deserialize, Serialize};

/// Artefacts written next to the batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Write one JSON file per scenario under `scenarios/`.
    #[serde(default = "OutputSpec::default_enabled")]
    pub per_scenario: bool,
    /// Write `ranking.csv`.
    #[serde(default = "OutputSpec::default_enabled")]
    pub ranking_csv: bool,
}

impl OutputSpec {
    const fn default_enabled() -> bool {
        true
    }
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            per_scenario: true,
            ranking_csv: true,
        }
    }
}

/// Named scenario inside a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedScenario {
    /// Unique name; also the file stem of the per-scenario output.
    pub name: String,
    /// Scenario definition.
    pub scenario: Scenario,
}

/// Batch of scenarios sharing one table set and aggregation config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan label.
    pub name: String,
    /// Aggregation config applied to every scenario.
    pub config: AggregationConfig,
    /// Replacement table file; the built-in tables are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<PathBuf>,
    /// Scenarios, sorted by name after loading.
    pub scenarios: Vec<PlannedScenario>,
    /// Output toggles.
    #[serde(default)]
    pub outputs: OutputSpec,
    /// Directory containing the plan on disk (ignored when serializing).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Plan {
    /// Returns the deterministic hash associated with the plan contents.
    pub fn plan_hash(&self) -> Result<String, LcaError> {
        stable_hash_string(self)
    }

    /// Produces a canonical YAML representation of the plan.
    pub fn to_yaml_string(&self) -> Result<String, LcaError> {
        to_yaml_string(self)
    }

    /// Resolved path of the replacement table file, if any.
    pub fn tables_path(&self) -> Option<PathBuf> {
        self.tables.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.base_dir.join(path)
            }
        })
    }

    /// Sorts scenarios by name and rejects duplicate or unsafe names.
    pub fn normalise(&mut self) -> Result<(), LcaError> {
        self.scenarios.sort_by(|a, b| a.name.cmp(&b.name));
        let mut seen = BTreeSet::new();
        for planned in &self.scenarios {
            let name = planned.name.as_str();
            let safe = !name.is_empty()
                && name
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
            if !safe {
                return Err(LcaError::InvalidScenario(
                    ErrorInfo::new("invalid_scenario_name", "scenario names may only use [A-Za-z0-9_-]")
                        .with_context("name", name),
                ));
            }
            if !seen.insert(name) {
                return Err(LcaError::InvalidScenario(
                    ErrorInfo::new("duplicate_scenario_name", "scenario name appears more than once")
                        .with_context("name", name),
                ));
            }
        }
        Ok(())
    }
}

/// Loads a plan from disk, ensuring deterministic ordering of scenarios.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<Plan, LcaError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| io_error("plan_read", err))?;
    let mut plan: Plan = from_yaml_slice(&bytes)?;
    plan.normalise()?;
    plan.base_dir = plan_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok(plan)
}
