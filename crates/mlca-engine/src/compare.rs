//! Side-by-side assessment of named scenarios.

use std::collections::BTreeMap;

use mlca_core::errors::LcaError;
use mlca_core::numeric::percent_of;
use mlca_tables::TableSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, LcaResult};
use crate::config::AggregationConfig;
use crate::scenario::Scenario;

/// Result or error of one named scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// Scenario assessed.
    Succeeded {
        /// Full result.
        result: Box<LcaResult>,
    },
    /// Scenario rejected; siblings are unaffected.
    Failed {
        /// Why it failed.
        error: LcaError,
    },
}

impl ScenarioOutcome {
    /// Returns the result when the scenario succeeded.
    pub fn result(&self) -> Option<&LcaResult> {
        match self {
            ScenarioOutcome::Succeeded { result } => Some(result),
            ScenarioOutcome::Failed { .. } => None,
        }
    }
}

/// One successful scenario in ranking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedScenario {
    /// Scenario name.
    pub name: String,
    /// Net total, kg CO2e.
    pub total_net_emissions_kg_co2e: f64,
    /// kg CO2e per kg.
    pub emission_intensity_kg_co2e_per_kg: f64,
}

/// Ranking of named scenarios by net total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    /// Successful scenarios, ascending by net total, ties by name.
    pub ranking: Vec<RankedScenario>,
    /// Lowest net total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<String>,
    /// Highest net total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worst: Option<String>,
    /// `worst − best`, kg CO2e.
    pub reduction_kg_co2e: f64,
    /// Reduction relative to the worst total, percent; 0 when worst ≤ 0.
    pub reduction_pct: f64,
    /// Outcome per scenario name.
    pub outcomes: BTreeMap<String, ScenarioOutcome>,
}

/// Ranks already computed outcomes.
pub fn rank_outcomes(outcomes: BTreeMap<String, ScenarioOutcome>) -> ScenarioComparison {
    let mut ranking: Vec<RankedScenario> = outcomes
        .iter()
        .filter_map(|(name, outcome)| {
            outcome.result().map(|result| RankedScenario {
                name: name.clone(),
                total_net_emissions_kg_co2e: result.total_net_emissions_kg_co2e,
                emission_intensity_kg_co2e_per_kg: result.emission_intensity_kg_co2e_per_kg,
            })
        })
        .collect();
    ranking.sort_by(|a, b| {
        a.total_net_emissions_kg_co2e
            .total_cmp(&b.total_net_emissions_kg_co2e)
            .then_with(|| a.name.cmp(&b.name))
    });

    let (best, worst, reduction, reduction_pct) = match (ranking.first(), ranking.last()) {
        (Some(best), Some(worst)) => {
            let reduction = worst.total_net_emissions_kg_co2e - best.total_net_emissions_kg_co2e;
            let pct = if worst.total_net_emissions_kg_co2e <= 0.0 {
                0.0
            } else {
                percent_of(reduction, worst.total_net_emissions_kg_co2e)
            };
            (Some(best.name.clone()), Some(worst.name.clone()), reduction, pct)
        }
        _ => (None, None, 0.0, 0.0),
    };

    ScenarioComparison {
        ranking,
        best,
        worst,
        reduction_kg_co2e: reduction,
        reduction_pct,
        outcomes,
    }
}

/// Assesses every scenario in parallel and ranks the successes.
pub fn compare_scenarios(
    tables: &TableSet,
    scenarios: &BTreeMap<String, Scenario>,
    config: &AggregationConfig,
) -> ScenarioComparison {
    let jobs: Vec<(&String, &Scenario)> = scenarios.iter().collect();
    let outcomes: BTreeMap<String, ScenarioOutcome> = jobs
        .par_iter()
        .map(|(name, scenario)| {
            let outcome = match aggregate(tables, scenario, config) {
                Ok(result) => ScenarioOutcome::Succeeded {
                    result: Box::new(result),
                },
                Err(error) => {
                    tracing::warn!(scenario = %name, code = error.code(), "scenario failed");
                    ScenarioOutcome::Failed { error }
                }
            };
            ((*name).clone(), outcome)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect();
    rank_outcomes(outcomes)
}
