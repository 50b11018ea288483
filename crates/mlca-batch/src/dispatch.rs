use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mlca_core::errors::{io_error, LcaError};
use mlca_core::hash::stable_hash_string;
use mlca_core::serde::to_canonical_json_bytes;
use mlca_engine::{aggregate, rank_outcomes, LcaResult, ScenarioOutcome};
use mlca_tables::{builtin_tables, load_tables, TableSet};
use rayon::prelude::*;

use crate::export::write_ranking_csv;
use crate::plan::{load_plan, Plan, PlannedScenario};
use crate::report::{BatchRanking, BatchReport, JobStatus, ScenarioReport};
use crate::stat::StatsSummary;

/// File name of the canonical batch report.
pub const REPORT_FILE: &str = "batch_report.json";
/// File name of the ranking table.
pub const RANKING_FILE: &str = "ranking.csv";

/// Options governing batch execution.
#[derive(Debug, Clone)]
pub struct RunOpts {
    /// Number of scenarios assessed in parallel.
    pub concurrency: usize,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Resolves the table set a plan runs against.
pub fn plan_tables(plan: &Plan) -> Result<Arc<TableSet>, LcaError> {
    match plan.tables_path() {
        Some(path) => Ok(Arc::new(load_tables(&path)?)),
        None => builtin_tables(),
    }
}

/// Executes a plan, emitting deterministic artefacts under `out`.
///
/// Invalid scenarios are recorded as failed; their siblings still run.
pub fn run_plan(plan: &Plan, out: &Path, opts: &RunOpts) -> Result<BatchReport, LcaError> {
    fs::create_dir_all(out).map_err(|err| io_error("plan_out_dir", err))?;
    let tables = plan_tables(plan)?;
    tracing::info!(
        plan = %plan.name,
        scenarios = plan.scenarios.len(),
        concurrency = opts.concurrency.max(1),
        "starting batch"
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.concurrency.max(1))
        .build()
        .map_err(|err| io_error("thread_pool", err))?;

    let results: Result<Vec<_>, LcaError> = pool.install(|| {
        plan.scenarios
            .par_iter()
            .enumerate()
            .map(|(index, planned)| -> Result<(usize, JobResult), LcaError> {
                let result = process_scenario(plan, &tables, planned, out)?;
                Ok((index, result))
            })
            .collect()
    });

    let mut ordered = results?;
    ordered.sort_by_key(|(index, _)| *index);

    let mut reports = Vec::with_capacity(ordered.len());
    let mut outcomes = BTreeMap::new();
    for (_, job) in ordered {
        reports.push(job.report);
        outcomes.insert(job.name, job.outcome);
    }

    let succeeded: Vec<&LcaResult> = outcomes.values().filter_map(ScenarioOutcome::result).collect();
    let failed = outcomes.len() - succeeded.len();
    let stats = StatsSummary::from_results(&succeeded, failed);
    let comparison = rank_outcomes(outcomes);
    let ranking = BatchRanking {
        entries: comparison.ranking,
        best: comparison.best,
        worst: comparison.worst,
        reduction_kg_co2e: comparison.reduction_kg_co2e,
        reduction_pct: comparison.reduction_pct,
    };

    if plan.outputs.ranking_csv {
        write_ranking_csv(&out.join(RANKING_FILE), &ranking)?;
    }
    let report = BatchReport::new(plan, &tables, reports, ranking, stats)?;
    let report_bytes = to_canonical_json_bytes(&report)?;
    fs::write(out.join(REPORT_FILE), report_bytes)
        .map_err(|err| io_error("batch_report_write", err))?;
    tracing::info!(
        plan = %plan.name,
        failed = report.failed_count(),
        "batch finished"
    );
    Ok(report)
}

/// Loads a plan from disk and executes it.
pub fn run_plan_from_path(
    plan_path: &Path,
    out: &Path,
    opts: &RunOpts,
) -> Result<BatchReport, LcaError> {
    let plan = load_plan(plan_path)?;
    run_plan(&plan, out, opts)
}

fn process_scenario(
    plan: &Plan,
    tables: &TableSet,
    planned: &PlannedScenario,
    out: &Path,
) -> Result<JobResult, LcaError> {
    let input_hash = stable_hash_string(&planned.scenario)?;
    let (report, outcome) = match aggregate(tables, &planned.scenario, &plan.config) {
        Ok(result) => {
            let report = ScenarioReport {
                name: planned.name.clone(),
                status: JobStatus::success(),
                input_hash,
                result_hash: Some(stable_hash_string(&result)?),
                total_net_emissions_kg_co2e: Some(result.total_net_emissions_kg_co2e),
                emission_intensity_kg_co2e_per_kg: Some(result.emission_intensity_kg_co2e_per_kg),
                warning_count: result.warnings.len(),
            };
            if plan.outputs.per_scenario {
                write_json(scenario_path(out, &planned.name), &result)?;
            }
            (
                report,
                ScenarioOutcome::Succeeded {
                    result: Box::new(result),
                },
            )
        }
        Err(error) => {
            tracing::warn!(scenario = %planned.name, code = error.code(), "scenario failed");
            let status = JobStatus::failed(error.clone());
            if plan.outputs.per_scenario {
                write_json(scenario_path(out, &planned.name), &status)?;
            }
            (
                ScenarioReport {
                    name: planned.name.clone(),
                    status,
                    input_hash,
                    result_hash: None,
                    total_net_emissions_kg_co2e: None,
                    emission_intensity_kg_co2e_per_kg: None,
                    warning_count: 0,
                },
                ScenarioOutcome::Failed { error },
            )
        }
    };
    Ok(JobResult {
        name: planned.name.clone(),
        report,
        outcome,
    })
}

fn scenario_path(out: &Path, name: &str) -> PathBuf {
    out.join("scenarios").join(format!("{name}.json"))
}

fn write_json<T: serde::Serialize>(path: PathBuf, value: &T) -> Result<(), LcaError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error("scenario_dir", err))?;
    }
    let bytes = to_canonical_json_bytes(value)?;
    fs::write(path, bytes).map_err(|err| io_error("scenario_write", err))
}

struct JobResult {
    name: String,
    report: ScenarioReport,
    outcome: ScenarioOutcome,
}
