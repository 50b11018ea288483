//! Whole-scenario assessment:
//! `Total = (1 − r)·Primary + r·Secondary + Transport − EOLCredit`.

use std::collections::BTreeMap;

use mlca_core::errors::{ErrorInfo, LcaError};
use mlca_core::numeric::{percent_of, ratio_or_zero, round_to};
use mlca_core::warnings::{DataQualityWarning, WarningSink};
use mlca_tables::{GwpVersion, MetalTables, TableSet};
use serde::{Deserialize, Serialize};

use crate::advice::{sort_by_priority, Priority, Recommendation};
use crate::config::AggregationConfig;
use crate::grid::grid_factor;
use crate::impact::{impact_categories, ImpactCategories};
use crate::process::{chain_emissions, compare_routes, resolve_route, ChainEmissions, ProcessOverride};
use crate::recycling::{circularity_recommendations, metrics_from_resolved, resolve_recycling, CircularityMetrics};
use crate::scenario::{AnalysisType, Scenario};
use crate::transport::{
    multimodal, route_logistics, transport_suggestions, MultimodalEmissions, TransportLeg,
};
use crate::uncertainty::{propagate, StageTotals, UncertaintyAnalysis, UNCERTAINTY_METHOD};

/// Methodology tag recorded in metadata.
pub const METHODOLOGY: &str = "attributional process LCA, GWP-100";
/// Share of gross emissions at which a source becomes a hotspot, percent.
pub const HOTSPOT_THRESHOLD_PCT: f64 = 20.0;
/// Share of gross emissions at which a hotspot is high priority, percent.
pub const HOTSPOT_HIGH_PCT: f64 = 50.0;

/// Mass split across the two production routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEmissions {
    /// `mass × (1 − r)`, kg.
    pub primary_mass_kg: f64,
    /// `mass × r`, kg.
    pub secondary_mass_kg: f64,
    /// Primary route at the primary mass.
    pub primary: ChainEmissions,
    /// Secondary route at the secondary mass.
    pub secondary: ChainEmissions,
    /// Sum of both routes, kg CO2e.
    pub total_kg_co2e: f64,
}

/// Electricity demand of the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyAnalysis {
    /// Primary route, kWh.
    pub primary_energy_kwh: f64,
    /// Secondary route, kWh.
    pub secondary_energy_kwh: f64,
    /// Both routes, kWh.
    pub total_energy_kwh: f64,
    /// kWh per kg of product.
    pub energy_intensity_kwh_per_kg: f64,
    /// Grid factor applied, kg CO2e/kWh.
    pub grid_factor_kg_co2e_per_kwh: f64,
    /// Renewable share of the mix, percent.
    pub renewable_share_pct: f64,
    /// `(EI_primary − EI_secondary) × secondary mass`, kWh.
    pub energy_savings_from_recycling_kwh: f64,
}

impl EnergyAnalysis {
    fn rounded(mut self, digits: u32) -> Self {
        self.primary_energy_kwh = round_to(self.primary_energy_kwh, digits);
        self.secondary_energy_kwh = round_to(self.secondary_energy_kwh, digits);
        self.total_energy_kwh = round_to(self.total_energy_kwh, digits);
        self.energy_intensity_kwh_per_kg = round_to(self.energy_intensity_kwh_per_kg, digits);
        self.renewable_share_pct = round_to(self.renewable_share_pct, digits);
        self.energy_savings_from_recycling_kwh =
            round_to(self.energy_savings_from_recycling_kwh, digits);
        self
    }
}

/// Net total split by emission source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionSourceBreakdown {
    /// Grid electricity, kg CO2e.
    pub electricity_kg_co2e: f64,
    /// Direct process gases, kg CO2e.
    pub process_gas_kg_co2e: f64,
    /// Freight, kg CO2e.
    pub transport_kg_co2e: f64,
    /// Production plus freight before the end-of-life credit, kg CO2e.
    pub total_pre_eol_kg_co2e: f64,
    /// End-of-life credit as a negative value, kg CO2e.
    pub eol_credit_kg_co2e: f64,
    /// Net total, kg CO2e.
    pub total_kg_co2e: f64,
}

impl EmissionSourceBreakdown {
    fn rounded(mut self, digits: u32) -> Self {
        self.electricity_kg_co2e = round_to(self.electricity_kg_co2e, digits);
        self.process_gas_kg_co2e = round_to(self.process_gas_kg_co2e, digits);
        self.transport_kg_co2e = round_to(self.transport_kg_co2e, digits);
        self.total_pre_eol_kg_co2e = round_to(self.total_pre_eol_kg_co2e, digits);
        self.eol_credit_kg_co2e = round_to(self.eol_credit_kg_co2e, digits);
        self.total_kg_co2e = round_to(self.total_kg_co2e, digits);
        self
    }
}

/// Per-kg intensities of the two routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteBenefit {
    /// Primary route, kg CO2e/kg.
    pub primary_intensity_kg_co2e_per_kg: f64,
    /// Secondary route, kg CO2e/kg.
    pub secondary_intensity_kg_co2e_per_kg: f64,
    /// Primary route, kWh/kg.
    pub primary_energy_kwh_per_kg: f64,
    /// Secondary route, kWh/kg.
    pub secondary_energy_kwh_per_kg: f64,
    /// `primary − secondary`, kg CO2e/kg.
    pub recycling_benefit_kg_co2e_per_kg: f64,
    /// Benefit relative to primary, percent.
    pub recycling_benefit_pct: f64,
}

impl RouteBenefit {
    fn rounded(mut self, digits: u32) -> Self {
        self.primary_intensity_kg_co2e_per_kg = round_to(self.primary_intensity_kg_co2e_per_kg, digits);
        self.secondary_intensity_kg_co2e_per_kg =
            round_to(self.secondary_intensity_kg_co2e_per_kg, digits);
        self.primary_energy_kwh_per_kg = round_to(self.primary_energy_kwh_per_kg, digits);
        self.secondary_energy_kwh_per_kg = round_to(self.secondary_energy_kwh_per_kg, digits);
        self.recycling_benefit_kg_co2e_per_kg = round_to(self.recycling_benefit_kg_co2e_per_kg, digits);
        self.recycling_benefit_pct = round_to(self.recycling_benefit_pct, digits);
        self
    }
}

/// Headline indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Net total, kg CO2e.
    pub carbon_footprint_kg_co2e: f64,
    /// kg CO2e per kg.
    pub emission_intensity_kg_co2e_per_kg: f64,
    /// Percent.
    pub renewable_energy_share_pct: f64,
    /// Circularity index in [0, 1].
    pub circularity_index: f64,
    /// `r × 100`.
    pub recycled_content_pct: f64,
    /// `min(100, r × 50 + energy score)`.
    pub resource_efficiency_score: f64,
}

impl Kpis {
    fn rounded(mut self, digits: u32) -> Self {
        self.carbon_footprint_kg_co2e = round_to(self.carbon_footprint_kg_co2e, digits);
        self.emission_intensity_kg_co2e_per_kg = round_to(self.emission_intensity_kg_co2e_per_kg, digits);
        self.renewable_energy_share_pct = round_to(self.renewable_energy_share_pct, digits);
        self.recycled_content_pct = round_to(self.recycled_content_pct, digits);
        self.resource_efficiency_score = round_to(self.resource_efficiency_score, digits);
        self
    }
}

/// Emission source carrying a large share of gross emissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Source key (`electricity`, `process_gases`, `transport`).
    pub source: String,
    /// kg CO2e.
    pub emissions_kg_co2e: f64,
    /// Share of gross emissions, percent.
    pub share_pct: f64,
    /// High at or above half of gross emissions.
    pub priority: Priority,
}

/// Context needed to interpret and reproduce a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcaMetadata {
    /// Canonical metal name.
    pub metal_type: String,
    /// Functional mass, kg.
    pub mass_kg: f64,
    /// Secondary share of production.
    pub recycled_fraction: f64,
    /// Product type, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    /// Region label, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Grid scenario label, or the preset name when none was given.
    pub grid_scenario: String,
    /// System boundary.
    pub analysis_type: AnalysisType,
    /// `1 kg {metal}`.
    pub functional_unit: String,
    /// Methodology tag.
    pub methodology: String,
    /// GWP table used.
    pub gwp_version: GwpVersion,
    /// Version label of the constant tables.
    pub table_version: String,
    /// Content hash of the constant tables.
    pub table_hash: String,
    /// Impact-category method tag.
    pub impact_method: String,
    /// Uncertainty propagation method tag.
    pub uncertainty_method: String,
    /// Calculation-time label from the config.
    pub calculated_at: String,
}

/// Complete assessment of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcaResult {
    /// Net total, kg CO2e.
    pub total_net_emissions_kg_co2e: f64,
    /// kg CO2e per kg; 0 at zero mass.
    pub emission_intensity_kg_co2e_per_kg: f64,
    /// Production routes.
    pub production_emissions: ProductionEmissions,
    /// Freight chain.
    pub transport_emissions: MultimodalEmissions,
    /// Circularity metrics behind the credit.
    pub circularity: CircularityMetrics,
    /// Credit subtracted from the total, kg CO2e.
    pub eol_credit_kg_co2e: f64,
    /// Electricity demand.
    pub energy_analysis: EnergyAnalysis,
    /// Net total by source.
    pub emission_source_breakdown: EmissionSourceBreakdown,
    /// Per-kg route intensities.
    pub route_comparison: RouteBenefit,
    /// Impact-category proxies.
    pub impact_categories: ImpactCategories,
    /// Interval around the net total.
    pub uncertainty_analysis: UncertaintyAnalysis,
    /// Headline indicators.
    pub kpis: Kpis,
    /// Sources at or above the hotspot threshold, largest first.
    pub hotspots: Vec<Hotspot>,
    /// Improvement suggestions, highest priority first.
    pub recommendations: Vec<Recommendation>,
    /// Inputs and provenance.
    pub lca_metadata: LcaMetadata,
    /// Non-fatal findings collected along the way.
    pub warnings: Vec<DataQualityWarning>,
}

fn check_overrides(
    metal: &str,
    metal_tables: &MetalTables,
    overrides: &BTreeMap<String, ProcessOverride>,
) -> Result<(), LcaError> {
    for name in overrides.keys() {
        if !metal_tables.processes.contains_key(name) {
            return Err(LcaError::UnknownProcess(
                ErrorInfo::new("unknown_process", "override names a process not tabulated for this metal")
                    .with_context("metal_type", metal)
                    .with_context("process", name.as_str()),
            ));
        }
    }
    Ok(())
}

fn check_route(kind: &str, route: &[String]) -> Result<(), LcaError> {
    if route.is_empty() {
        return Err(LcaError::InvalidScenario(
            ErrorInfo::new("empty_route", "production route needs at least one process")
                .with_context("route", kind),
        ));
    }
    Ok(())
}

fn energy_score(energy_intensity_kwh_per_kg: f64) -> f64 {
    if energy_intensity_kwh_per_kg < 2.0 {
        50.0
    } else if energy_intensity_kwh_per_kg < 8.0 {
        35.0
    } else if energy_intensity_kwh_per_kg < 15.0 {
        20.0
    } else {
        10.0
    }
}

fn hotspots(breakdown: &EmissionSourceBreakdown) -> Vec<Hotspot> {
    let gross = breakdown.total_pre_eol_kg_co2e;
    if gross <= 0.0 {
        return Vec::new();
    }
    let sources = [
        ("electricity", breakdown.electricity_kg_co2e),
        ("process_gases", breakdown.process_gas_kg_co2e),
        ("transport", breakdown.transport_kg_co2e),
    ];
    let mut found: Vec<Hotspot> = sources
        .iter()
        .map(|(source, emissions)| (source, emissions, percent_of(*emissions, gross)))
        .filter(|(_, _, share)| *share >= HOTSPOT_THRESHOLD_PCT)
        .map(|(source, emissions, share)| Hotspot {
            source: source.to_string(),
            emissions_kg_co2e: *emissions,
            share_pct: share,
            priority: if share >= HOTSPOT_HIGH_PCT {
                Priority::High
            } else {
                Priority::Medium
            },
        })
        .collect();
    found.sort_by(|a, b| {
        b.share_pct
            .total_cmp(&a.share_pct)
            .then_with(|| a.source.cmp(&b.source))
    });
    found
}

/// Assesses one scenario. Pure: the same scenario, tables and config give the
/// same result.
pub fn aggregate(
    tables: &TableSet,
    scenario: &Scenario,
    config: &AggregationConfig,
) -> Result<LcaResult, LcaError> {
    scenario.validate()?;
    config.validate()?;
    let gwp = config.gwp_version;
    let (metal, metal_tables) = tables.metal(&scenario.metal_type)?;
    check_overrides(&metal, metal_tables, &scenario.process_overrides)?;
    let mut sink = WarningSink::new();

    let (grid_label, mix) = scenario.resolved_mix(tables)?;
    let grid = grid_factor(tables, &mix)?;
    sink.extend(grid.warnings.iter().cloned());
    let factor = grid.factor_kg_co2e_per_kwh;

    let primary_names = scenario
        .primary_route
        .as_deref()
        .unwrap_or(metal_tables.primary_route.as_slice());
    let secondary_names = scenario
        .secondary_route
        .as_deref()
        .unwrap_or(metal_tables.secondary_route.as_slice());
    check_route("primary", primary_names)?;
    check_route("secondary", secondary_names)?;
    let primary_route = resolve_route(tables, &metal, primary_names, &scenario.process_overrides)?;
    let secondary_route =
        resolve_route(tables, &metal, secondary_names, &scenario.process_overrides)?;

    let mass = scenario.mass_kg;
    let r = scenario.recycled_fraction;
    let primary_mass = mass * (1.0 - r);
    let secondary_mass = mass * r;
    let primary = chain_emissions(tables, &primary_route, primary_mass, factor, gwp)?;
    let secondary = chain_emissions(tables, &secondary_route, secondary_mass, factor, gwp)?;
    let unit = compare_routes(tables, &primary_route, &secondary_route, 1.0, factor, gwp)?;
    sink.extend(unit.warnings.iter().cloned());

    let shipment_tonnes = mass / 1000.0;
    let transport = match &scenario.logistics {
        Some(options) => route_logistics(tables, metal_tables, mass, r, options)?,
        None => multimodal(tables, &scenario.transport, shipment_tonnes)?,
    };

    let product_type = scenario.product_type.as_deref();
    let collection_region = scenario.collection_region.as_deref();
    let (inputs, recycling_warnings) = resolve_recycling(
        tables,
        &metal,
        product_type,
        &scenario.recycling,
        collection_region,
        &scenario.material_factors,
        r * 100.0,
    )?;
    sink.extend(recycling_warnings);
    let circularity = metrics_from_resolved(
        tables,
        &metal,
        product_type,
        collection_region,
        inputs,
        Vec::new(),
    );

    let credit_applies =
        config.include_eol_credit && scenario.analysis_type != AnalysisType::GateToGate;
    let eol_credit = if credit_applies {
        circularity.avoided_impact_per_kg * mass
    } else {
        0.0
    };

    let production_total = primary.total_kg_co2e + secondary.total_kg_co2e;
    let net = production_total + transport.total_kg_co2e - eol_credit;
    let intensity = ratio_or_zero(net, mass);
    tracing::debug!(
        metal = %metal,
        primary = primary.total_kg_co2e,
        secondary = secondary.total_kg_co2e,
        transport = transport.total_kg_co2e,
        eol_credit,
        net,
        "aggregated scenario"
    );

    let total_energy = primary.total_energy_kwh + secondary.total_energy_kwh;
    let energy_intensity = ratio_or_zero(total_energy, mass);
    let energy_analysis = EnergyAnalysis {
        primary_energy_kwh: primary.total_energy_kwh,
        secondary_energy_kwh: secondary.total_energy_kwh,
        total_energy_kwh: total_energy,
        energy_intensity_kwh_per_kg: energy_intensity,
        grid_factor_kg_co2e_per_kwh: factor,
        renewable_share_pct: grid.renewable_share_pct,
        energy_savings_from_recycling_kwh: (unit.primary.total_energy_kwh
            - unit.secondary.total_energy_kwh)
            * secondary_mass,
    };

    let breakdown = EmissionSourceBreakdown {
        electricity_kg_co2e: primary.electricity_kg_co2e + secondary.electricity_kg_co2e,
        process_gas_kg_co2e: primary.direct_kg_co2e + secondary.direct_kg_co2e,
        transport_kg_co2e: transport.total_kg_co2e,
        total_pre_eol_kg_co2e: production_total + transport.total_kg_co2e,
        eol_credit_kg_co2e: -eol_credit,
        total_kg_co2e: net,
    };

    let route_comparison = RouteBenefit {
        primary_intensity_kg_co2e_per_kg: unit.primary.total_kg_co2e,
        secondary_intensity_kg_co2e_per_kg: unit.secondary.total_kg_co2e,
        primary_energy_kwh_per_kg: unit.primary.total_energy_kwh,
        secondary_energy_kwh_per_kg: unit.secondary.total_energy_kwh,
        recycling_benefit_kg_co2e_per_kg: unit.emission_savings_kg_co2e,
        recycling_benefit_pct: unit.emission_reduction_pct,
    };

    let impacts = impact_categories(&metal_tables.impact_factors, config.impact_method, net, mass);
    let uncertainty = propagate(
        &tables.uncertainty,
        net,
        StageTotals {
            primary_kg_co2e: primary.total_kg_co2e,
            secondary_kg_co2e: secondary.total_kg_co2e,
            transport_kg_co2e: transport.total_kg_co2e,
        },
        config.confidence_level,
    )?;

    let kpis = Kpis {
        carbon_footprint_kg_co2e: net,
        emission_intensity_kg_co2e_per_kg: intensity,
        renewable_energy_share_pct: grid.renewable_share_pct,
        circularity_index: circularity.circularity_index,
        recycled_content_pct: r * 100.0,
        resource_efficiency_score: (r * 50.0 + energy_score(energy_intensity)).min(100.0),
    };

    let mut recommendations = circularity_recommendations(tables, &circularity);
    for leg in &transport.legs {
        let mut priced = TransportLeg::new(leg.mode.as_str(), leg.distance_km, leg.weight_tonnes)
            .with_empty_return(leg.empty_return_multiplier > 1.0);
        priced.emission_factor_kg_co2e_per_t_km = Some(leg.emission_factor);
        priced.load_factor = Some(leg.load_factor);
        recommendations.extend(transport_suggestions(tables, &priced)?);
    }
    sort_by_priority(&mut recommendations);

    let lca_metadata = LcaMetadata {
        functional_unit: format!("1 kg {metal}"),
        metal_type: metal,
        mass_kg: mass,
        recycled_fraction: r,
        product_type: scenario.product_type.clone(),
        region: scenario.region.clone(),
        grid_scenario: scenario.grid_scenario.clone().unwrap_or(grid_label),
        analysis_type: scenario.analysis_type,
        methodology: METHODOLOGY.to_string(),
        gwp_version: gwp,
        table_version: tables.version.clone(),
        table_hash: tables.content_hash()?,
        impact_method: config.impact_method.tag().to_string(),
        uncertainty_method: UNCERTAINTY_METHOD.to_string(),
        calculated_at: config.calculated_at.clone(),
    };

    let result = LcaResult {
        total_net_emissions_kg_co2e: net,
        emission_intensity_kg_co2e_per_kg: intensity,
        production_emissions: ProductionEmissions {
            primary_mass_kg: primary_mass,
            secondary_mass_kg: secondary_mass,
            primary,
            secondary,
            total_kg_co2e: production_total,
        },
        transport_emissions: transport,
        circularity,
        eol_credit_kg_co2e: eol_credit,
        hotspots: hotspots(&breakdown),
        energy_analysis,
        emission_source_breakdown: breakdown,
        route_comparison,
        impact_categories: impacts,
        uncertainty_analysis: uncertainty,
        kpis,
        recommendations,
        lca_metadata,
        warnings: sink.into_vec(),
    };

    Ok(match config.precision {
        Some(digits) => result.rounded(digits),
        None => result,
    })
}

impl LcaResult {
    /// Rounds the summary sections; detailed breakdowns keep full precision.
    pub fn rounded(mut self, digits: u32) -> Self {
        self.total_net_emissions_kg_co2e = round_to(self.total_net_emissions_kg_co2e, digits);
        self.emission_intensity_kg_co2e_per_kg =
            round_to(self.emission_intensity_kg_co2e_per_kg, digits);
        self.eol_credit_kg_co2e = round_to(self.eol_credit_kg_co2e, digits);
        self.energy_analysis = self.energy_analysis.rounded(digits);
        self.emission_source_breakdown = self.emission_source_breakdown.rounded(digits);
        self.route_comparison = self.route_comparison.rounded(digits);
        self.impact_categories = self.impact_categories.rounded(digits);
        self.uncertainty_analysis = self.uncertainty_analysis.rounded(digits);
        self.kpis = self.kpis.rounded(digits);
        for hotspot in &mut self.hotspots {
            hotspot.emissions_kg_co2e = round_to(hotspot.emissions_kg_co2e, digits);
            hotspot.share_pct = round_to(hotspot.share_pct, digits);
        }
        self
    }
}
