use std::collections::BTreeMap;

use mlca_engine::LcaResult;
use serde::{Deserialize, Serialize};

/// Quantile summary for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantiles {
    /// 5th percentile estimate.
    pub q05: f64,
    /// Median (50th percentile) estimate.
    pub q50: f64,
    /// 95th percentile estimate.
    pub q95: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

/// Cross-scenario statistics over successful results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StatsSummary {
    /// Number of scenarios assessed.
    pub succeeded: usize,
    /// Number of scenarios rejected.
    pub failed: usize,
    /// Quantiles keyed by metric name; empty when nothing succeeded.
    pub quantiles: BTreeMap<String, Quantiles>,
}

impl StatsSummary {
    /// Builds a deterministic summary for the successful results.
    pub fn from_results(results: &[&LcaResult], failed: usize) -> Self {
        let mut quantiles = BTreeMap::new();
        let metrics: [(&str, fn(&LcaResult) -> f64); 4] = [
            ("total_net_emissions_kg_co2e", |r| r.total_net_emissions_kg_co2e),
            ("emission_intensity_kg_co2e_per_kg", |r| r.emission_intensity_kg_co2e_per_kg),
            ("circularity_index", |r| r.kpis.circularity_index),
            ("energy_intensity_kwh_per_kg", |r| r.energy_analysis.energy_intensity_kwh_per_kg),
        ];
        for (name, map) in metrics {
            if let Some(summary) = quantile_summary(results, map) {
                quantiles.insert(name.to_string(), summary);
            }
        }
        Self {
            succeeded: results.len(),
            failed,
            quantiles,
        }
    }
}

fn quantile_summary<F>(results: &[&LcaResult], map: F) -> Option<Quantiles>
where
    F: Fn(&LcaResult) -> f64,
{
    let mut values: Vec<f64> = results.iter().map(|result| map(*result)).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    Some(Quantiles {
        q05: percentile(&values, 0.05),
        q50: percentile(&values, 0.5),
        q95: percentile(&values, 0.95),
        mean: values.iter().sum::<f64>() / values.len() as f64,
    })
}

fn percentile(values: &[f64], quantile: f64) -> f64 {
    let position = quantile * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        values[lower]
    } else {
        let weight = position - lower as f64;
        values[lower] * (1.0 - weight) + values[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.5), 3.0);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert!((percentile(&values, 0.05) - 1.2).abs() < 1e-12);
        assert_eq!(percentile(&[7.0], 0.95), 7.0);
    }

    #[test]
    fn empty_results_have_no_quantiles() {
        let summary = StatsSummary::from_results(&[], 3);
        assert!(summary.quantiles.is_empty());
        assert_eq!(summary.failed, 3);
    }
}
