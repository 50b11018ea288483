//! Recycling and circularity accounting.
//!
//! Inputs are percentages; every formula below works on fractions in [0, 1].

use std::collections::BTreeMap;

use mlca_core::errors::{out_of_range, ErrorInfo, LcaError};
use mlca_core::numeric::{percent_of, round_to};
use mlca_core::warnings::DataQualityWarning;
use mlca_tables::{CircularityWeights, GradeThreshold, TableSet};
use serde::{Deserialize, Serialize};

use crate::advice::{sort_by_priority, Priority, Recommendation};

/// Recycling inputs in percent. Missing fields fall back to metal presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecyclingParams {
    /// End-of-life collection rate, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_rate_pct: Option<f64>,
    /// Recovery efficiency of recyclers, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycling_efficiency_pct: Option<f64>,
    /// Recycled content already in the product, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_secondary_content_pct: Option<f64>,
    /// Material lost during the use phase, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_phase_losses_pct: Option<f64>,
}

/// Material emission factors; missing values come from the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MaterialEmissionFactors {
    /// Virgin metal, kg CO2e/kg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virgin_ef_kg_co2e_per_kg: Option<f64>,
    /// Secondary metal, kg CO2e/kg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_ef_kg_co2e_per_kg: Option<f64>,
}

/// Fully resolved recycling inputs as fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecycling {
    /// Collection rate after regional adjustment.
    pub collection_rate: f64,
    /// Recycling efficiency.
    pub recycling_efficiency: f64,
    /// Existing secondary content.
    pub existing_secondary_content: f64,
    /// Use-phase losses.
    pub use_phase_losses: f64,
    /// Product lifetime, years.
    pub product_lifetime_years: f64,
    /// Virgin emission factor, kg CO2e/kg.
    pub virgin_ef_kg_co2e_per_kg: f64,
    /// Secondary emission factor, kg CO2e/kg.
    pub secondary_ef_kg_co2e_per_kg: f64,
    /// Informal-sector share of the metal's recycling.
    pub informal_sector_share: f64,
}

fn pct_to_fraction(field: &str, pct: f64) -> Result<f64, LcaError> {
    if pct.is_finite() && (0.0..=100.0).contains(&pct) {
        Ok(pct / 100.0)
    } else {
        Err(out_of_range(field, pct, "[0, 100]"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64, LcaError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(out_of_range(field, value, "[0, inf)"))
    }
}

fn missing_field(field: &str, fallback: f64) -> DataQualityWarning {
    DataQualityWarning::new(
        "recycling_field_defaulted",
        format!("{field} not supplied; using {fallback:.4}"),
    )
    .with_context("field", field)
}

/// Resolves optional recycling inputs against the metal presets.
///
/// `fallback_existing_pct` fills a missing existing-secondary-content field.
/// Every defaulted field yields one warning.
pub fn resolve_recycling(
    tables: &TableSet,
    metal: &str,
    product_type: Option<&str>,
    params: &RecyclingParams,
    collection_region: Option<&str>,
    materials: &MaterialEmissionFactors,
    fallback_existing_pct: f64,
) -> Result<(ResolvedRecycling, Vec<DataQualityWarning>), LcaError> {
    let (_, metal_tables) = tables.metal(metal)?;
    let presets = &metal_tables.recycling;
    let mut warnings = Vec::new();

    let regional_factor = match collection_region {
        Some(region) => {
            let efficiency = tables
                .recycling
                .regional_collection_efficiency
                .get(region)
                .ok_or_else(|| {
                    LcaError::UnknownPreset(
                        ErrorInfo::new("unknown_collection_region", "collection region not found")
                            .with_context("region", region),
                    )
                })?;
            efficiency / tables.recycling.reference_collection_efficiency
        }
        None => 1.0,
    };

    let collection_rate = match params.collection_rate_pct {
        Some(pct) => pct_to_fraction("collection_rate_pct", pct)?,
        None => {
            let preset = (presets.collection_rate * regional_factor).min(1.0);
            warnings.push(missing_field("collection_rate_pct", preset * 100.0));
            preset
        }
    };
    let recycling_efficiency = match params.recycling_efficiency_pct {
        Some(pct) => pct_to_fraction("recycling_efficiency_pct", pct)?,
        None => {
            warnings.push(missing_field(
                "recycling_efficiency_pct",
                presets.recycling_efficiency * 100.0,
            ));
            presets.recycling_efficiency
        }
    };
    let existing_secondary_content = match params.existing_secondary_content_pct {
        Some(pct) => pct_to_fraction("existing_secondary_content_pct", pct)?,
        None => {
            warnings.push(missing_field("existing_secondary_content_pct", fallback_existing_pct));
            pct_to_fraction("existing_secondary_content_pct", fallback_existing_pct)?
        }
    };
    let product_lifetime_years = tables.product_lifetime(metal_tables, product_type);
    let use_phase_losses = match params.use_phase_losses_pct {
        Some(pct) => pct_to_fraction("use_phase_losses_pct", pct)?,
        None => {
            let losses = tables.recycling.use_losses.losses_for(product_lifetime_years);
            warnings.push(missing_field("use_phase_losses_pct", losses * 100.0));
            losses
        }
    };

    let virgin_ef = non_negative(
        "virgin_ef_kg_co2e_per_kg",
        materials
            .virgin_ef_kg_co2e_per_kg
            .unwrap_or(metal_tables.material_factors.virgin_ef_kg_co2e_per_kg),
    )?;
    let secondary_ef = non_negative(
        "secondary_ef_kg_co2e_per_kg",
        materials
            .secondary_ef_kg_co2e_per_kg
            .unwrap_or(virgin_ef * (1.0 - presets.energy_savings_vs_primary)),
    )?;

    Ok((
        ResolvedRecycling {
            collection_rate,
            recycling_efficiency,
            existing_secondary_content,
            use_phase_losses,
            product_lifetime_years,
            virgin_ef_kg_co2e_per_kg: virgin_ef,
            secondary_ef_kg_co2e_per_kg: secondary_ef,
            informal_sector_share: presets.informal_sector_share,
        },
        warnings,
    ))
}

/// `collection × efficiency × (1 − losses)`, capped at 1.
pub fn effective_secondary_content(collection: f64, efficiency: f64, losses: f64) -> f64 {
    (collection * efficiency * (1.0 - losses)).clamp(0.0, 1.0)
}

/// `min(1, existing + ESC)`.
pub fn secondary_share(existing: f64, esc: f64) -> f64 {
    (existing + esc).clamp(0.0, 1.0)
}

/// `ESC × virgin_EF`, kg CO2e per kg.
pub fn avoided_virgin_impact(esc: f64, virgin_ef: f64) -> f64 {
    esc * virgin_ef
}

/// `(1 − SS) × virgin_EF + SS × secondary_EF`, kg CO2e per kg.
pub fn effective_emission_factor(share: f64, virgin_ef: f64, secondary_ef: f64) -> f64 {
    let blended = (1.0 - share) * virgin_ef + share * secondary_ef;
    blended.clamp(virgin_ef.min(secondary_ef), virgin_ef.max(secondary_ef))
}

/// Weighted composite of recycled content, end-of-life recovery and durability, 3 decimals.
pub fn circularity_index(
    weights: &CircularityWeights,
    share: f64,
    eol_recovery: f64,
    lifetime_years: f64,
    lifetime_normalization_years: f64,
) -> f64 {
    let durability = (lifetime_years / lifetime_normalization_years).clamp(0.0, 1.0);
    let index = weights.secondary_share * share
        + weights.eol_recovery * eol_recovery
        + weights.lifetime * durability;
    round_to(index, 3)
}

/// Letter grade for an index; `F` below the lowest threshold.
pub fn circularity_grade(thresholds: &[GradeThreshold], index: f64) -> String {
    thresholds
        .iter()
        .find(|threshold| index >= threshold.min_index)
        .map(|threshold| threshold.grade.clone())
        .unwrap_or_else(|| "F".to_string())
}

/// Circularity outcome for one metal/product/parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularityMetrics {
    /// Canonical metal name.
    pub metal_type: String,
    /// Product type, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    /// Collection region, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_region: Option<String>,
    /// Inputs after resolution.
    pub inputs: ResolvedRecycling,
    /// Effective secondary content (ESC).
    pub effective_secondary_content: f64,
    /// Secondary share.
    pub secondary_share: f64,
    /// `collection × efficiency`.
    pub eol_recovery_rate: f64,
    /// Avoided virgin impact, kg CO2e per kg.
    pub avoided_impact_per_kg: f64,
    /// Blended product emission factor, kg CO2e per kg.
    pub effective_ef_per_kg: f64,
    /// `virgin_EF − effective_EF`, kg CO2e per kg.
    pub emission_savings_per_kg: f64,
    /// Savings relative to virgin, percent.
    pub emission_reduction_vs_virgin_pct: f64,
    /// `(1 − losses) × collection × efficiency`.
    pub material_flow_efficiency: f64,
    /// `secondary_share × efficiency`.
    pub resource_efficiency: f64,
    /// Composite index in [0, 1].
    pub circularity_index: f64,
    /// Letter grade.
    pub grade: String,
    /// Defaulted inputs and other findings.
    #[serde(default)]
    pub warnings: Vec<DataQualityWarning>,
}

/// Applies the recycling formulas to resolved inputs.
pub fn metrics_from_resolved(
    tables: &TableSet,
    metal: &str,
    product_type: Option<&str>,
    collection_region: Option<&str>,
    inputs: ResolvedRecycling,
    warnings: Vec<DataQualityWarning>,
) -> CircularityMetrics {
    let esc = effective_secondary_content(
        inputs.collection_rate,
        inputs.recycling_efficiency,
        inputs.use_phase_losses,
    );
    let share = secondary_share(inputs.existing_secondary_content, esc);
    let virgin = inputs.virgin_ef_kg_co2e_per_kg;
    let effective = effective_emission_factor(share, virgin, inputs.secondary_ef_kg_co2e_per_kg);
    let eol_recovery = inputs.collection_rate * inputs.recycling_efficiency;
    let index = circularity_index(
        &tables.recycling.circularity_weights,
        share,
        eol_recovery,
        inputs.product_lifetime_years,
        tables.recycling.lifetime_normalization_years,
    );

    CircularityMetrics {
        metal_type: metal.to_string(),
        product_type: product_type.map(str::to_string),
        collection_region: collection_region.map(str::to_string),
        effective_secondary_content: esc,
        secondary_share: share,
        eol_recovery_rate: eol_recovery,
        avoided_impact_per_kg: avoided_virgin_impact(esc, virgin),
        effective_ef_per_kg: effective,
        emission_savings_per_kg: virgin - effective,
        emission_reduction_vs_virgin_pct: percent_of(virgin - effective, virgin),
        material_flow_efficiency: (1.0 - inputs.use_phase_losses) * eol_recovery,
        resource_efficiency: share * inputs.recycling_efficiency,
        circularity_index: index,
        grade: circularity_grade(&tables.recycling.grade_thresholds, index),
        inputs,
        warnings,
    }
}

/// Circularity metrics for a metal, product and parameter set.
pub fn circularity_metrics(
    tables: &TableSet,
    metal: &str,
    product_type: Option<&str>,
    params: &RecyclingParams,
    collection_region: Option<&str>,
    materials: &MaterialEmissionFactors,
) -> Result<CircularityMetrics, LcaError> {
    let canonical = tables.canonical_metal(metal)?;
    let (inputs, warnings) = resolve_recycling(
        tables,
        &canonical,
        product_type,
        params,
        collection_region,
        materials,
        0.0,
    )?;
    Ok(metrics_from_resolved(
        tables,
        &canonical,
        product_type,
        collection_region,
        inputs,
        warnings,
    ))
}

/// One entry of a circularity ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCircularity {
    /// Scenario name.
    pub name: String,
    /// Index of the scenario.
    pub circularity_index: f64,
    /// Grade of the scenario.
    pub grade: String,
}

/// Named parameter sets ranked by circularity index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularityComparison {
    /// Descending by index, ties by name.
    pub ranking: Vec<RankedCircularity>,
    /// Highest-index scenario.
    pub best: String,
    /// Lowest-index scenario.
    pub worst: String,
    /// `best − worst` index.
    pub improvement_potential: f64,
    /// Full metrics per scenario.
    pub metrics: BTreeMap<String, CircularityMetrics>,
}

/// Ranks named parameter sets by circularity index.
pub fn compare_circularity(
    tables: &TableSet,
    metal: &str,
    product_type: Option<&str>,
    scenarios: &BTreeMap<String, RecyclingParams>,
    collection_region: Option<&str>,
    materials: &MaterialEmissionFactors,
) -> Result<CircularityComparison, LcaError> {
    let mut metrics = BTreeMap::new();
    for (name, params) in scenarios {
        let result = circularity_metrics(tables, metal, product_type, params, collection_region, materials)
            .map_err(|err| with_scenario(err, name))?;
        metrics.insert(name.clone(), result);
    }

    let mut ranking: Vec<RankedCircularity> = metrics
        .iter()
        .map(|(name, m)| RankedCircularity {
            name: name.clone(),
            circularity_index: m.circularity_index,
            grade: m.grade.clone(),
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.circularity_index
            .total_cmp(&a.circularity_index)
            .then_with(|| a.name.cmp(&b.name))
    });
    let (best, worst) = match (ranking.first(), ranking.last()) {
        (Some(best), Some(worst)) => (best.clone(), worst.clone()),
        _ => {
            return Err(LcaError::InvalidScenario(ErrorInfo::new(
                "no_scenarios",
                "circularity comparison needs at least one scenario",
            )))
        }
    };

    Ok(CircularityComparison {
        improvement_potential: best.circularity_index - worst.circularity_index,
        best: best.name,
        worst: worst.name,
        ranking,
        metrics,
    })
}

fn with_scenario(err: LcaError, name: &str) -> LcaError {
    let tag = |info: ErrorInfo| info.with_context("scenario", name);
    match err {
        LcaError::InvalidScenario(info) => LcaError::InvalidScenario(tag(info)),
        LcaError::UnknownGas(info) => LcaError::UnknownGas(tag(info)),
        LcaError::UnknownSource(info) => LcaError::UnknownSource(tag(info)),
        LcaError::UnknownProcess(info) => LcaError::UnknownProcess(tag(info)),
        LcaError::UnknownTransportMode(info) => LcaError::UnknownTransportMode(tag(info)),
        LcaError::UnknownPreset(info) => LcaError::UnknownPreset(tag(info)),
        LcaError::Table(info) => LcaError::Table(tag(info)),
        LcaError::Serde(info) => LcaError::Serde(tag(info)),
    }
}

/// Collection and recovery assumptions for an end-of-life scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EolScenario {
    /// Collection rate, percent.
    pub collection_rate_pct: f64,
    /// Recovery efficiency, percent.
    pub recycling_efficiency_pct: f64,
}

/// Material fate of one end-of-life scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EolOutcome {
    /// Scenario name.
    pub name: String,
    /// Mass collected, kg.
    pub collected_kg: f64,
    /// Mass recovered as secondary metal, kg.
    pub recovered_kg: f64,
    /// Mass lost, kg.
    pub lost_kg: f64,
    /// `collection × efficiency`.
    pub recovery_rate: f64,
    /// Avoided virgin production emissions, kg CO2e.
    pub avoided_emissions_kg_co2e: f64,
}

/// End-of-life scenarios compared on avoided emissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EolComparison {
    /// Mass reaching end of life, kg.
    pub mass_kg: f64,
    /// Virgin emission factor applied, kg CO2e/kg.
    pub virgin_ef_kg_co2e_per_kg: f64,
    /// Outcomes in name order.
    pub outcomes: Vec<EolOutcome>,
    /// Scenario avoiding the most emissions (ties by name).
    pub best: String,
    /// Scenario avoiding the least emissions (ties by name).
    pub worst: String,
    /// `best − worst` avoided emissions, kg CO2e.
    pub improvement_potential_kg_co2e: f64,
}

/// Recovered, lost and avoided quantities for each end-of-life scenario.
pub fn end_of_life_scenarios(
    tables: &TableSet,
    metal: &str,
    mass_kg: f64,
    scenarios: &BTreeMap<String, EolScenario>,
    virgin_ef_override: Option<f64>,
) -> Result<EolComparison, LcaError> {
    let (_, metal_tables) = tables.metal(metal)?;
    let mass = non_negative("mass_kg", mass_kg)?;
    let virgin_ef = non_negative(
        "virgin_ef_kg_co2e_per_kg",
        virgin_ef_override.unwrap_or(metal_tables.material_factors.virgin_ef_kg_co2e_per_kg),
    )?;

    let mut outcomes = Vec::with_capacity(scenarios.len());
    for (name, scenario) in scenarios {
        let collection = pct_to_fraction("collection_rate_pct", scenario.collection_rate_pct)
            .map_err(|err| with_scenario(err, name))?;
        let efficiency = pct_to_fraction("recycling_efficiency_pct", scenario.recycling_efficiency_pct)
            .map_err(|err| with_scenario(err, name))?;
        let collected = mass * collection;
        let recovered = collected * efficiency;
        outcomes.push(EolOutcome {
            name: name.clone(),
            collected_kg: collected,
            recovered_kg: recovered,
            lost_kg: mass - recovered,
            recovery_rate: collection * efficiency,
            avoided_emissions_kg_co2e: recovered * virgin_ef,
        });
    }

    let by_avoided = |a: &&EolOutcome, b: &&EolOutcome| {
        a.avoided_emissions_kg_co2e
            .total_cmp(&b.avoided_emissions_kg_co2e)
            .then_with(|| b.name.cmp(&a.name))
    };
    let (best, worst) = match (
        outcomes.iter().max_by(by_avoided),
        outcomes.iter().min_by(by_avoided),
    ) {
        (Some(best), Some(worst)) => (best.clone(), worst.clone()),
        _ => {
            return Err(LcaError::InvalidScenario(ErrorInfo::new(
                "no_scenarios",
                "end-of-life comparison needs at least one scenario",
            )))
        }
    };

    Ok(EolComparison {
        mass_kg: mass,
        virgin_ef_kg_co2e_per_kg: virgin_ef,
        improvement_potential_kg_co2e: best.avoided_emissions_kg_co2e
            - worst.avoided_emissions_kg_co2e,
        best: best.name,
        worst: worst.name,
        outcomes,
    })
}

const COLLECTION_TARGET: f64 = 0.8;
const COLLECTION_URGENT: f64 = 0.6;
const EFFICIENCY_TARGET: f64 = 0.9;
const SECONDARY_SHARE_TARGET: f64 = 0.6;
const LIFETIME_TARGET_YEARS: f64 = 20.0;
const INFORMAL_SECTOR_LIMIT: f64 = 0.7;

/// Rule-based recommendations for sub-scores below their thresholds.
pub fn circularity_recommendations(
    tables: &TableSet,
    metrics: &CircularityMetrics,
) -> Vec<Recommendation> {
    let inputs = &metrics.inputs;
    let weights = &tables.recycling.circularity_weights;
    let mut recommendations = Vec::new();

    if inputs.collection_rate < COLLECTION_TARGET {
        let target = (inputs.collection_rate + 0.2).min(0.9);
        let priority = if inputs.collection_rate < COLLECTION_URGENT {
            Priority::High
        } else {
            Priority::Medium
        };
        recommendations.push(
            Recommendation::new("collection", priority, "expand end-of-life collection")
                .with_values(inputs.collection_rate, target)
                .with_impact(
                    (target - inputs.collection_rate)
                        * inputs.recycling_efficiency
                        * weights.eol_recovery,
                ),
        );
    }

    if inputs.recycling_efficiency < EFFICIENCY_TARGET {
        let target = (inputs.recycling_efficiency + 0.1).min(0.95);
        recommendations.push(
            Recommendation::new("efficiency", Priority::Medium, "upgrade sorting and melting yield")
                .with_values(inputs.recycling_efficiency, target)
                .with_impact(
                    (target - inputs.recycling_efficiency)
                        * inputs.collection_rate
                        * weights.eol_recovery,
                ),
        );
    }

    if metrics.secondary_share < SECONDARY_SHARE_TARGET {
        recommendations.push(
            Recommendation::new("secondary_content", Priority::High, "increase recycled content in the product")
                .with_values(metrics.secondary_share, SECONDARY_SHARE_TARGET)
                .with_impact((SECONDARY_SHARE_TARGET - metrics.secondary_share) * weights.secondary_share),
        );
    }

    if inputs.product_lifetime_years < LIFETIME_TARGET_YEARS {
        let normalization = tables.recycling.lifetime_normalization_years;
        recommendations.push(
            Recommendation::new("durability", Priority::Medium, "design for longer service life")
                .with_values(inputs.product_lifetime_years, LIFETIME_TARGET_YEARS)
                .with_impact(
                    (LIFETIME_TARGET_YEARS.min(normalization) - inputs.product_lifetime_years)
                        / normalization
                        * weights.lifetime,
                ),
        );
    }

    if let Some(region) = &metrics.collection_region {
        if tables.recycling.low_infrastructure_regions.contains(region) {
            recommendations.push(Recommendation::new(
                "infrastructure",
                Priority::High,
                format!("build collection infrastructure in {region} areas"),
            ));
        }
    }

    if inputs.informal_sector_share > INFORMAL_SECTOR_LIMIT {
        recommendations.push(
            Recommendation::new("policy", Priority::Medium, "formalise informal recycling channels")
                .with_values(inputs.informal_sector_share, INFORMAL_SECTOR_LIMIT),
        );
    }

    sort_by_priority(&mut recommendations);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlca_tables::builtin_tables;
    use proptest::prelude::*;

    fn explicit(collection: f64, efficiency: f64, existing: f64, losses: f64) -> RecyclingParams {
        RecyclingParams {
            collection_rate_pct: Some(collection),
            recycling_efficiency_pct: Some(efficiency),
            existing_secondary_content_pct: Some(existing),
            use_phase_losses_pct: Some(losses),
        }
    }

    #[test]
    fn formula_chain_for_explicit_inputs() {
        let tables = builtin_tables().expect("tables");
        let materials = MaterialEmissionFactors {
            virgin_ef_kg_co2e_per_kg: Some(10.0),
            secondary_ef_kg_co2e_per_kg: Some(1.0),
        };
        let metrics = circularity_metrics(
            &tables,
            "aluminum",
            Some("building_construction"),
            &explicit(80.0, 90.0, 20.0, 10.0),
            None,
            &materials,
        )
        .expect("metrics");
        let esc = 0.8 * 0.9 * 0.9;
        assert!((metrics.effective_secondary_content - esc).abs() < 1e-12);
        assert!((metrics.secondary_share - (0.2 + esc)).abs() < 1e-12);
        assert!((metrics.avoided_impact_per_kg - esc * 10.0).abs() < 1e-12);
        let share = 0.2 + esc;
        assert!((metrics.effective_ef_per_kg - ((1.0 - share) * 10.0 + share)).abs() < 1e-12);
        let index = 0.4 * share + 0.35 * 0.72 + 0.25 * 1.0;
        assert_eq!(metrics.circularity_index, round_to(index, 3));
        assert_eq!(metrics.grade, "A");
        assert!(metrics.warnings.is_empty());
    }

    #[test]
    fn missing_fields_use_presets_and_warn() {
        let tables = builtin_tables().expect("tables");
        let metrics = circularity_metrics(
            &tables,
            "al",
            Some("beverage_cans"),
            &RecyclingParams::default(),
            None,
            &MaterialEmissionFactors::default(),
        )
        .expect("metrics");
        assert_eq!(metrics.metal_type, "aluminum");
        assert_eq!(metrics.inputs.collection_rate, 0.65);
        assert_eq!(metrics.inputs.recycling_efficiency, 0.92);
        assert_eq!(metrics.inputs.product_lifetime_years, 0.25);
        assert!((metrics.inputs.use_phase_losses - 0.05025).abs() < 1e-12);
        assert!((metrics.inputs.secondary_ef_kg_co2e_per_kg - 11.5 * 0.05).abs() < 1e-12);
        assert_eq!(metrics.warnings.len(), 4);
    }

    #[test]
    fn region_scales_preset_collection() {
        let tables = builtin_tables().expect("tables");
        let rural = circularity_metrics(
            &tables,
            "copper",
            None,
            &RecyclingParams::default(),
            Some("rural"),
            &MaterialEmissionFactors::default(),
        )
        .expect("metrics");
        assert!((rural.inputs.collection_rate - 0.78 * 0.35 / 0.75).abs() < 1e-12);
        let recs = circularity_recommendations(&tables, &rural);
        assert!(recs.iter().any(|r| r.category == "infrastructure"));
        assert!(recs.iter().any(|r| r.category == "policy"));
        assert_eq!(recs[0].priority, Priority::High);

        let err = circularity_metrics(
            &tables,
            "copper",
            None,
            &RecyclingParams::default(),
            Some("orbit"),
            &MaterialEmissionFactors::default(),
        )
        .expect_err("unknown region");
        assert!(matches!(err, LcaError::UnknownPreset(_)));
    }

    #[test]
    fn out_of_range_percentage_is_invalid() {
        let tables = builtin_tables().expect("tables");
        let err = circularity_metrics(
            &tables,
            "copper",
            None,
            &explicit(120.0, 90.0, 0.0, 5.0),
            None,
            &MaterialEmissionFactors::default(),
        )
        .expect_err("120% collection");
        assert!(matches!(err, LcaError::InvalidScenario(_)));
    }

    #[test]
    fn grades_follow_thresholds() {
        let tables = builtin_tables().expect("tables");
        let thresholds = &tables.recycling.grade_thresholds;
        assert_eq!(circularity_grade(thresholds, 0.8), "A");
        assert_eq!(circularity_grade(thresholds, 0.79), "B");
        assert_eq!(circularity_grade(thresholds, 0.4), "C");
        assert_eq!(circularity_grade(thresholds, 0.2), "D");
        assert_eq!(circularity_grade(thresholds, 0.19), "F");
    }

    #[test]
    fn comparison_ranks_by_index() {
        let tables = builtin_tables().expect("tables");
        let mut scenarios = BTreeMap::new();
        scenarios.insert("baseline".to_string(), explicit(50.0, 80.0, 10.0, 5.0));
        scenarios.insert("improved".to_string(), explicit(90.0, 95.0, 40.0, 5.0));
        scenarios.insert("twin".to_string(), explicit(50.0, 80.0, 10.0, 5.0));
        let cmp = compare_circularity(
            &tables,
            "copper",
            Some("electrical_wiring"),
            &scenarios,
            None,
            &MaterialEmissionFactors::default(),
        )
        .expect("compare");
        assert_eq!(cmp.best, "improved");
        assert_eq!(cmp.worst, "twin");
        assert_eq!(cmp.ranking[1].name, "baseline");
        assert!(cmp.improvement_potential > 0.0);
    }

    #[test]
    fn end_of_life_mass_balance() {
        let tables = builtin_tables().expect("tables");
        let mut scenarios = BTreeMap::new();
        scenarios.insert(
            "landfill".to_string(),
            EolScenario {
                collection_rate_pct: 10.0,
                recycling_efficiency_pct: 50.0,
            },
        );
        scenarios.insert(
            "closed_loop".to_string(),
            EolScenario {
                collection_rate_pct: 95.0,
                recycling_efficiency_pct: 95.0,
            },
        );
        let cmp = end_of_life_scenarios(&tables, "aluminum", 1000.0, &scenarios, None).expect("eol");
        for outcome in &cmp.outcomes {
            assert!((outcome.recovered_kg + outcome.lost_kg - 1000.0).abs() < 1e-9);
        }
        assert_eq!(cmp.best, "closed_loop");
        assert_eq!(cmp.worst, "landfill");
        assert!((cmp.improvement_potential_kg_co2e - (902.5 - 50.0) * 11.5).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn share_and_blended_factor_stay_bounded(
            collection in 0.0f64..=100.0,
            efficiency in 0.0f64..=100.0,
            existing in 0.0f64..=100.0,
            losses in 0.0f64..=100.0,
            virgin in 0.0f64..50.0,
            secondary in 0.0f64..50.0,
        ) {
            let tables = builtin_tables().expect("tables");
            let materials = MaterialEmissionFactors {
                virgin_ef_kg_co2e_per_kg: Some(virgin),
                secondary_ef_kg_co2e_per_kg: Some(secondary),
            };
            let metrics = circularity_metrics(
                &tables,
                "copper",
                None,
                &explicit(collection, efficiency, existing, losses),
                None,
                &materials,
            )
            .expect("metrics");
            prop_assert!((0.0..=1.0).contains(&metrics.secondary_share));
            prop_assert!((0.0..=1.0).contains(&metrics.circularity_index));
            prop_assert!(metrics.effective_ef_per_kg >= virgin.min(secondary));
            prop_assert!(metrics.effective_ef_per_kg <= virgin.max(secondary));
        }
    }
}
