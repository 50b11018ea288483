//! Electricity-mix weighting into a single grid emission factor.

use std::collections::BTreeMap;

use mlca_core::errors::{out_of_range, ErrorInfo, LcaError};
use mlca_core::numeric::{percent_of, round_to};
use mlca_core::warnings::DataQualityWarning;
use mlca_tables::TableSet;
use serde::{Deserialize, Serialize};

/// Energy source mapped to its percentage share (0–100).
pub type ElectricityMix = BTreeMap<String, f64>;

/// Weighted grid factor plus the checks made on the mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFactorReport {
    /// kg CO2e per kWh.
    pub factor_kg_co2e_per_kwh: f64,
    /// Sum of all shares, percent.
    pub share_total_pct: f64,
    /// Share of renewable sources, percent.
    pub renewable_share_pct: f64,
    /// Non-fatal findings on the mix.
    #[serde(default)]
    pub warnings: Vec<DataQualityWarning>,
}

/// Difference between two electricity mixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixComparison {
    /// Label of the base mix.
    pub base_label: String,
    /// Label of the target mix.
    pub target_label: String,
    /// Base factor, kg CO2e/kWh.
    pub base_factor: f64,
    /// Target factor, kg CO2e/kWh.
    pub target_factor: f64,
    /// `base − target`; positive when the target is cleaner.
    pub factor_reduction: f64,
    /// Reduction relative to the base factor, percent.
    pub factor_reduction_pct: f64,
    /// Base renewable share, percent.
    pub base_renewable_share_pct: f64,
    /// Target renewable share, percent.
    pub target_renewable_share_pct: f64,
    /// `target − base` renewable share, percentage points.
    pub renewable_share_increase: f64,
}

fn unknown_source(source: &str, tables: &TableSet) -> LcaError {
    LcaError::UnknownSource(
        ErrorInfo::new("unknown_source", "electricity source has no emission factor")
            .with_context("source", source)
            .with_hint(format!(
                "expected one of: {}",
                tables
                    .grid
                    .source_factors
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
    )
}

fn check_shares(tables: &TableSet, mix: &ElectricityMix) -> Result<(), LcaError> {
    for (source, share) in mix {
        if !tables.grid.source_factors.contains_key(source) {
            return Err(unknown_source(source, tables));
        }
        if !share.is_finite() || *share < 0.0 || *share > 100.0 {
            return Err(out_of_range(&format!("electricity_mix.{source}"), *share, "[0, 100]"));
        }
    }
    Ok(())
}

/// Percentage of the mix supplied by renewable sources.
pub fn renewable_share(tables: &TableSet, mix: &ElectricityMix) -> Result<f64, LcaError> {
    check_shares(tables, mix)?;
    Ok(tables
        .grid
        .renewable_sources
        .iter()
        .filter_map(|source| mix.get(source))
        .sum())
}

/// Computes `Σ share/100 × factor` for a mix.
///
/// A share total outside `100 ± tolerance` is reported as a warning and the
/// shares are used as given.
pub fn grid_factor(tables: &TableSet, mix: &ElectricityMix) -> Result<GridFactorReport, LcaError> {
    check_shares(tables, mix)?;
    let mut factor = 0.0;
    for (source, share) in mix {
        let source_factor = tables
            .grid
            .source_factors
            .get(source)
            .ok_or_else(|| unknown_source(source, tables))?;
        factor += share / 100.0 * source_factor;
    }
    let share_total: f64 = mix.values().sum();

    let mut warnings = Vec::new();
    let tolerance = tables.grid.share_tolerance_pct;
    if (share_total - 100.0).abs() > tolerance {
        warnings.push(
            DataQualityWarning::new(
                "grid_share_total",
                format!("electricity mix shares sum to {share_total:.3}%, expected 100 ± {tolerance}"),
            )
            .with_context("share_total_pct", share_total.to_string()),
        );
    }

    Ok(GridFactorReport {
        factor_kg_co2e_per_kwh: round_to(factor, tables.grid.factor_precision),
        share_total_pct: share_total,
        renewable_share_pct: renewable_share(tables, mix)?,
        warnings,
    })
}

/// Diffs two mixes.
pub fn compare_mixes(
    tables: &TableSet,
    base_label: &str,
    base: &ElectricityMix,
    target_label: &str,
    target: &ElectricityMix,
) -> Result<MixComparison, LcaError> {
    let base_report = grid_factor(tables, base)?;
    let target_report = grid_factor(tables, target)?;
    let reduction = base_report.factor_kg_co2e_per_kwh - target_report.factor_kg_co2e_per_kwh;
    Ok(MixComparison {
        base_label: base_label.to_string(),
        target_label: target_label.to_string(),
        base_factor: base_report.factor_kg_co2e_per_kwh,
        target_factor: target_report.factor_kg_co2e_per_kwh,
        factor_reduction: reduction,
        factor_reduction_pct: percent_of(reduction, base_report.factor_kg_co2e_per_kwh),
        base_renewable_share_pct: base_report.renewable_share_pct,
        target_renewable_share_pct: target_report.renewable_share_pct,
        renewable_share_increase: target_report.renewable_share_pct
            - base_report.renewable_share_pct,
    })
}

/// Diffs two named presets.
pub fn compare_presets(
    tables: &TableSet,
    base: &str,
    target: &str,
) -> Result<MixComparison, LcaError> {
    let base_mix = tables.grid_preset(base)?;
    let target_mix = tables.grid_preset(target)?;
    compare_mixes(tables, base, base_mix, target, target_mix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlca_tables::builtin_tables;

    fn mix(entries: &[(&str, f64)]) -> ElectricityMix {
        entries
            .iter()
            .map(|(source, share)| (source.to_string(), *share))
            .collect()
    }

    #[test]
    fn single_source_mix_returns_source_constant() {
        let tables = builtin_tables().expect("tables");
        for (source, constant) in &tables.grid.source_factors {
            let report = grid_factor(&tables, &mix(&[(source.as_str(), 100.0)])).expect("factor");
            assert_eq!(report.factor_kg_co2e_per_kwh, *constant, "{source}");
            assert!(report.warnings.is_empty());
        }
    }

    #[test]
    fn national_average_factor() {
        let tables = builtin_tables().expect("tables");
        let preset = tables.grid_preset("national_average").expect("preset");
        let report = grid_factor(&tables, preset).expect("factor");
        assert_eq!(report.factor_kg_co2e_per_kwh, 0.596056);
        assert!((report.renewable_share_pct - 23.8).abs() < 1e-9);
    }

    #[test]
    fn off_total_mix_warns_without_normalising() {
        let tables = builtin_tables().expect("tables");
        let report = grid_factor(&tables, &mix(&[("coal", 50.0), ("hydro", 40.0)])).expect("factor");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, "grid_share_total");
        assert_eq!(report.factor_kg_co2e_per_kwh, round_to(0.5 * 0.82 + 0.4 * 0.024, 6));
    }

    #[test]
    fn unknown_source_is_an_error() {
        let tables = builtin_tables().expect("tables");
        let err = grid_factor(&tables, &mix(&[("fusion", 100.0)])).expect_err("unknown");
        assert!(matches!(err, LcaError::UnknownSource(_)));
    }

    #[test]
    fn negative_share_is_invalid() {
        let tables = builtin_tables().expect("tables");
        let err = grid_factor(&tables, &mix(&[("coal", 110.0), ("solar", -10.0)]))
            .expect_err("negative share");
        assert!(matches!(err, LcaError::InvalidScenario(_)));
    }

    #[test]
    fn greener_target_reduces_factor() {
        let tables = builtin_tables().expect("tables");
        let cmp = compare_presets(&tables, "current_2024", "ambitious_2030").expect("compare");
        assert!(cmp.factor_reduction > 0.0);
        assert!(cmp.factor_reduction_pct > 0.0);
        assert!((cmp.renewable_share_increase - (38.9 - 23.8)).abs() < 1e-9);
    }
}
