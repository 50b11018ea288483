//! Freight emissions: `weight × distance × (EF / load_factor) × empty_return`.

use std::collections::{BTreeMap, BTreeSet};

use mlca_core::errors::{out_of_range, ErrorInfo, LcaError};
use mlca_core::numeric::{percent_of, ratio_or_zero};
use mlca_tables::{LogisticsStage, MetalTables, ModeCategory, TableSet};
use serde::{Deserialize, Serialize};

use crate::advice::{sort_by_priority, Priority, Recommendation};

/// Legs longer than this are candidates for multimodal routing, km.
const MULTIMODAL_DISTANCE_KM: f64 = 500.0;
/// Rail must undercut the leg by this ratio to suggest a modal shift.
const MODAL_SHIFT_RATIO: f64 = 0.7;
/// Load factor below which load consolidation is suggested.
const TARGET_LOAD_FACTOR: f64 = 0.8;
/// Mode used to price modal-shift alternatives.
const RAIL_REFERENCE_MODE: &str = "rail_freight";
/// Mode of generated logistics legs unless overridden.
pub const DEFAULT_LOGISTICS_MODE: &str = "truck_heavy";

fn default_empty_return() -> bool {
    true
}

fn default_logistics_mode() -> String {
    DEFAULT_LOGISTICS_MODE.to_string()
}

/// Production route a generated freight leg serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Ore, concentrate and primary metal.
    Primary,
    /// Scrap and remelted metal.
    Secondary,
}

/// One freight leg. Missing factors are taken from the mode table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportLeg {
    /// Mode identifier (e.g. `truck_heavy`).
    pub mode: String,
    /// Leg distance, km.
    pub distance_km: f64,
    /// Cargo weight, tonnes. Replaced by the shipment weight in a chain.
    #[serde(default)]
    pub weight_tonnes: f64,
    /// Override of the tabulated factor, kg CO2e per t·km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_factor_kg_co2e_per_t_km: Option<f64>,
    /// Override of the tabulated load factor, (0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_factor: Option<f64>,
    /// Whether the vehicle returns empty.
    #[serde(default = "default_empty_return")]
    pub empty_return: bool,
}

impl TransportLeg {
    /// Leg with tabulated factors.
    pub fn new(mode: impl Into<String>, distance_km: f64, weight_tonnes: f64) -> Self {
        Self {
            mode: mode.into(),
            distance_km,
            weight_tonnes,
            emission_factor_kg_co2e_per_t_km: None,
            load_factor: None,
            empty_return: default_empty_return(),
        }
    }

    /// Sets the empty-return flag.
    pub fn with_empty_return(mut self, empty_return: bool) -> Self {
        self.empty_return = empty_return;
        self
    }
}

/// Priced freight leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegEmissions {
    /// Mode identifier.
    pub mode: String,
    /// Mode family.
    pub category: ModeCategory,
    /// Distance, km.
    pub distance_km: f64,
    /// Weight, tonnes.
    pub weight_tonnes: f64,
    /// Emission factor at full load, kg CO2e per t·km.
    pub emission_factor: f64,
    /// Load factor applied.
    pub load_factor: f64,
    /// `EF / load_factor`.
    pub adjusted_emission_factor: f64,
    /// 1.5 for empty-returning road legs, else 1.
    pub empty_return_multiplier: f64,
    /// Emissions before the empty-return multiplier, kg CO2e.
    pub base_kg_co2e: f64,
    /// Emissions including the multiplier, kg CO2e.
    pub total_kg_co2e: f64,
    /// Total per t·km; 0 when no freight moves.
    pub intensity_kg_co2e_per_t_km: f64,
    /// Route served, for legs generated from route logistics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteKind>,
    /// Logistics stage name, for legs generated from route logistics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

/// Prices a single leg.
pub fn transport_emissions(tables: &TableSet, leg: &TransportLeg) -> Result<LegEmissions, LcaError> {
    let mode = tables.transport_mode(&leg.mode)?;
    if !leg.distance_km.is_finite() || leg.distance_km < 0.0 {
        return Err(out_of_range("distance_km", leg.distance_km, "[0, inf)"));
    }
    if !leg.weight_tonnes.is_finite() || leg.weight_tonnes < 0.0 {
        return Err(out_of_range("weight_tonnes", leg.weight_tonnes, "[0, inf)"));
    }
    let emission_factor = leg
        .emission_factor_kg_co2e_per_t_km
        .unwrap_or(mode.emission_factor);
    if !emission_factor.is_finite() || emission_factor < 0.0 {
        return Err(out_of_range("emission_factor_kg_co2e_per_t_km", emission_factor, "[0, inf)"));
    }
    let load_factor = leg
        .load_factor
        .or(mode.load_factor)
        .unwrap_or(tables.transport.default_load_factor);
    if !load_factor.is_finite() || load_factor <= 0.0 || load_factor > 1.0 {
        return Err(out_of_range("load_factor", load_factor, "(0, 1]"));
    }

    let multiplier = if leg.empty_return && mode.category == ModeCategory::Road {
        tables.transport.empty_return_multiplier
    } else {
        1.0
    };
    let adjusted = emission_factor / load_factor;
    let tonne_km = leg.weight_tonnes * leg.distance_km;
    let base = tonne_km * adjusted;
    let total = base * multiplier;

    Ok(LegEmissions {
        mode: leg.mode.clone(),
        category: mode.category,
        distance_km: leg.distance_km,
        weight_tonnes: leg.weight_tonnes,
        emission_factor,
        load_factor,
        adjusted_emission_factor: adjusted,
        empty_return_multiplier: multiplier,
        base_kg_co2e: base,
        total_kg_co2e: total,
        intensity_kg_co2e_per_t_km: ratio_or_zero(total, tonne_km),
        route: None,
        stage: None,
    })
}

/// Priced transport chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultimodalEmissions {
    /// Shipment weight, tonnes.
    pub total_weight_tonnes: f64,
    /// Sum of leg distances, km.
    pub total_distance_km: f64,
    /// Sum of leg emissions, kg CO2e.
    pub total_kg_co2e: f64,
    /// Emissions of legs serving the primary route, kg CO2e.
    #[serde(default)]
    pub primary_route_kg_co2e: f64,
    /// Emissions of legs serving the secondary route, kg CO2e.
    #[serde(default)]
    pub secondary_route_kg_co2e: f64,
    /// Total per t·km moved over the whole chain.
    pub average_intensity_kg_co2e_per_t_km: f64,
    /// Legs in chain order.
    pub legs: Vec<LegEmissions>,
}

impl MultimodalEmissions {
    fn from_legs(total_weight_tonnes: f64, legs: Vec<LegEmissions>) -> Self {
        let route_total = |kind: RouteKind| -> f64 {
            legs.iter()
                .filter(|leg| leg.route == Some(kind))
                .map(|leg| leg.total_kg_co2e)
                .sum()
        };
        let primary = route_total(RouteKind::Primary);
        let secondary = route_total(RouteKind::Secondary);
        let total_distance: f64 = legs.iter().map(|leg| leg.distance_km).sum();
        let tonne_km: f64 = legs.iter().map(|leg| leg.weight_tonnes * leg.distance_km).sum();
        let total: f64 = legs.iter().map(|leg| leg.total_kg_co2e).sum();
        Self {
            total_weight_tonnes,
            total_distance_km: total_distance,
            total_kg_co2e: total,
            primary_route_kg_co2e: primary,
            secondary_route_kg_co2e: secondary,
            average_intensity_kg_co2e_per_t_km: ratio_or_zero(total, tonne_km),
            legs,
        }
    }
}

/// Prices every leg at the shipment weight and sums them.
pub fn multimodal(
    tables: &TableSet,
    legs: &[TransportLeg],
    total_weight_tonnes: f64,
) -> Result<MultimodalEmissions, LcaError> {
    if !total_weight_tonnes.is_finite() || total_weight_tonnes < 0.0 {
        return Err(out_of_range("total_weight_tonnes", total_weight_tonnes, "[0, inf)"));
    }
    let priced = legs
        .iter()
        .map(|leg| {
            let shipment = TransportLeg {
                weight_tonnes: total_weight_tonnes,
                ..leg.clone()
            };
            transport_emissions(tables, &shipment)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MultimodalEmissions::from_legs(total_weight_tonnes, priced))
}

/// Route-split freight generated from the metal's typical logistics stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticsOptions {
    /// Mode of every generated leg.
    #[serde(default = "default_logistics_mode")]
    pub mode: String,
    /// Stage distance overrides, km. Keys must name a tabulated stage.
    #[serde(default)]
    pub distances_km: BTreeMap<String, f64>,
    /// Whether the vehicles return empty.
    #[serde(default = "default_empty_return")]
    pub empty_return: bool,
}

impl Default for LogisticsOptions {
    fn default() -> Self {
        Self {
            mode: default_logistics_mode(),
            distances_km: BTreeMap::new(),
            empty_return: default_empty_return(),
        }
    }
}

impl LogisticsOptions {
    /// Options with tabulated distances on `mode`.
    pub fn with_mode(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            ..Self::default()
        }
    }

    /// Overrides one stage distance.
    pub fn with_distance(mut self, stage: impl Into<String>, distance_km: f64) -> Self {
        self.distances_km.insert(stage.into(), distance_km);
        self
    }
}

/// Prices the metal's logistics stages, split by production route.
///
/// Primary stages carry `(1 − r)·mass`, secondary stages carry `r·mass`.
/// A route carrying no mass contributes no legs.
pub fn route_logistics(
    tables: &TableSet,
    metal: &MetalTables,
    mass_kg: f64,
    recycled_fraction: f64,
    options: &LogisticsOptions,
) -> Result<MultimodalEmissions, LcaError> {
    if !mass_kg.is_finite() || mass_kg < 0.0 {
        return Err(out_of_range("mass_kg", mass_kg, "[0, inf)"));
    }
    if !recycled_fraction.is_finite() || !(0.0..=1.0).contains(&recycled_fraction) {
        return Err(out_of_range("recycled_fraction", recycled_fraction, "[0, 1]"));
    }
    if let Some(unknown) = options
        .distances_km
        .keys()
        .find(|stage| !metal.logistics.has_stage(stage))
    {
        return Err(LcaError::InvalidScenario(
            ErrorInfo::new("unknown_logistics_stage", "distance override names no logistics stage")
                .with_context("stage", unknown.as_str()),
        ));
    }

    let shipment_tonnes = mass_kg / 1000.0;
    let routes = [
        (
            RouteKind::Primary,
            &metal.logistics.primary,
            (1.0 - recycled_fraction) * shipment_tonnes,
        ),
        (
            RouteKind::Secondary,
            &metal.logistics.secondary,
            recycled_fraction * shipment_tonnes,
        ),
    ];
    let mut priced = Vec::new();
    for (kind, stages, weight_tonnes) in routes {
        if weight_tonnes <= 0.0 {
            continue;
        }
        for LogisticsStage { stage, distance_km } in stages {
            let distance = options.distances_km.get(stage).copied().unwrap_or(*distance_km);
            let leg = TransportLeg::new(options.mode.as_str(), distance, weight_tonnes)
                .with_empty_return(options.empty_return);
            let mut emissions = transport_emissions(tables, &leg)?;
            emissions.route = Some(kind);
            emissions.stage = Some(stage.clone());
            priced.push(emissions);
        }
    }
    tracing::debug!(legs = priced.len(), recycled_fraction, "priced route logistics");
    Ok(MultimodalEmissions::from_legs(shipment_tonnes, priced))
}

/// Candidate modes ranked for one weight and distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeComparison {
    /// Legs ranked ascending by emissions, ties by mode name.
    pub ranking: Vec<LegEmissions>,
    /// Lowest-emission mode.
    pub best_mode: String,
    /// Highest-emission mode.
    pub worst_mode: String,
    /// `worst − best`, kg CO2e.
    pub reduction_kg_co2e: f64,
    /// Reduction relative to the worst mode, percent.
    pub reduction_pct: f64,
}

fn rank_legs(mut legs: Vec<LegEmissions>) -> Result<ModeComparison, LcaError> {
    legs.sort_by(|a, b| {
        a.total_kg_co2e
            .total_cmp(&b.total_kg_co2e)
            .then_with(|| a.mode.cmp(&b.mode))
    });
    let (best, worst) = match (legs.first(), legs.last()) {
        (Some(best), Some(worst)) => (best.clone(), worst.clone()),
        _ => {
            return Err(LcaError::InvalidScenario(ErrorInfo::new(
                "no_transport_modes",
                "mode comparison needs at least one mode",
            )))
        }
    };
    let reduction = worst.total_kg_co2e - best.total_kg_co2e;
    Ok(ModeComparison {
        best_mode: best.mode,
        worst_mode: worst.mode,
        reduction_kg_co2e: reduction,
        reduction_pct: percent_of(reduction, worst.total_kg_co2e),
        ranking: legs,
    })
}

/// Ranks candidate modes for a fixed weight and distance.
pub fn compare_modes(
    tables: &TableSet,
    weight_tonnes: f64,
    distance_km: f64,
    modes: &[String],
    empty_return: bool,
) -> Result<ModeComparison, LcaError> {
    let unique: BTreeSet<&String> = modes.iter().collect();
    let legs = unique
        .into_iter()
        .map(|mode| {
            let leg = TransportLeg::new(mode.as_str(), distance_km, weight_tonnes)
                .with_empty_return(empty_return);
            transport_emissions(tables, &leg)
        })
        .collect::<Result<Vec<_>, _>>()?;
    rank_legs(legs)
}

/// Mode options on a tabulated freight corridor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorOptions {
    /// Origin city.
    pub origin: String,
    /// Destination city.
    pub destination: String,
    /// Ranked options; each mode uses its own corridor distance.
    pub comparison: ModeComparison,
}

/// Prices every mode with a known distance on a corridor.
pub fn route_options(
    tables: &TableSet,
    origin: &str,
    destination: &str,
    weight_tonnes: f64,
    empty_return: bool,
) -> Result<CorridorOptions, LcaError> {
    let corridor = tables.transport.corridor(origin, destination).ok_or_else(|| {
        LcaError::UnknownPreset(
            ErrorInfo::new("unknown_corridor", "freight corridor is not tabulated")
                .with_context("origin", origin)
                .with_context("destination", destination),
        )
    })?;
    let mut legs = Vec::new();
    for (corridor_mode, distance) in &corridor.distances_km {
        let Some(mode) = tables.transport.corridor_modes.get(corridor_mode) else {
            tracing::debug!(corridor_mode = %corridor_mode, "corridor mode has no freight factor");
            continue;
        };
        let leg = TransportLeg::new(mode.as_str(), *distance, weight_tonnes)
            .with_empty_return(empty_return);
        legs.push(transport_emissions(tables, &leg)?);
    }
    Ok(CorridorOptions {
        origin: corridor.origin.clone(),
        destination: corridor.destination.clone(),
        comparison: rank_legs(legs)?,
    })
}

/// Rule-based suggestions for lowering a leg's emissions.
pub fn transport_suggestions(
    tables: &TableSet,
    leg: &TransportLeg,
) -> Result<Vec<Recommendation>, LcaError> {
    let priced = transport_emissions(tables, leg)?;
    let mut suggestions = Vec::new();

    if priced.category == ModeCategory::Road {
        let rail = TransportLeg::new(RAIL_REFERENCE_MODE, leg.distance_km, leg.weight_tonnes)
            .with_empty_return(false);
        let rail = transport_emissions(tables, &rail)?;
        if rail.total_kg_co2e < MODAL_SHIFT_RATIO * priced.total_kg_co2e {
            suggestions.push(
                Recommendation::new(
                    "modal_shift",
                    Priority::High,
                    format!("shift {} to rail freight", priced.mode),
                )
                .with_values(priced.total_kg_co2e, rail.total_kg_co2e)
                .with_impact(priced.total_kg_co2e - rail.total_kg_co2e),
            );
        }
    }

    if priced.load_factor < TARGET_LOAD_FACTOR {
        let improved = priced.total_kg_co2e * priced.load_factor / TARGET_LOAD_FACTOR;
        suggestions.push(
            Recommendation::new(
                "load_optimization",
                Priority::Medium,
                "consolidate shipments to raise the load factor",
            )
            .with_values(priced.load_factor, TARGET_LOAD_FACTOR)
            .with_impact(priced.total_kg_co2e - improved),
        );
    }

    if priced.category == ModeCategory::Road && priced.distance_km > MULTIMODAL_DISTANCE_KM {
        suggestions.push(
            Recommendation::new(
                "multimodal",
                Priority::Medium,
                "combine rail trunk haul with road for first and last mile",
            )
            .with_values(priced.distance_km, MULTIMODAL_DISTANCE_KM),
        );
    }

    sort_by_priority(&mut suggestions);
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlca_tables::builtin_tables;

    #[test]
    fn heavy_truck_reference_case() {
        let tables = builtin_tables().expect("tables");
        let leg = TransportLeg::new("truck_heavy", 500.0, 100.0).with_empty_return(false);
        let result = transport_emissions(&tables, &leg).expect("emissions");
        assert!((result.base_kg_co2e - 4133.333333).abs() < 1e-3);
        assert_eq!(result.total_kg_co2e, result.base_kg_co2e);

        let returning = transport_emissions(&tables, &leg.with_empty_return(true)).expect("emissions");
        assert_eq!(returning.base_kg_co2e, result.base_kg_co2e);
        assert_eq!(returning.total_kg_co2e, 1.5 * result.base_kg_co2e);
    }

    #[test]
    fn empty_return_only_applies_to_road() {
        let tables = builtin_tables().expect("tables");
        for mode in ["rail_freight", "coastal_shipping", "pipeline"] {
            let leg = TransportLeg::new(mode, 100.0, 10.0);
            let result = transport_emissions(&tables, &leg).expect("emissions");
            assert_eq!(result.empty_return_multiplier, 1.0, "{mode}");
        }
        let bulk = transport_emissions(&tables, &TransportLeg::new("bulk_truck", 100.0, 10.0))
            .expect("emissions");
        assert_eq!(bulk.empty_return_multiplier, 1.5);
        assert_eq!(bulk.load_factor, 0.75);
    }

    #[test]
    fn unknown_mode_and_bad_load_factor() {
        let tables = builtin_tables().expect("tables");
        let err = transport_emissions(&tables, &TransportLeg::new("air_freight", 10.0, 1.0))
            .expect_err("unknown mode");
        assert!(matches!(err, LcaError::UnknownTransportMode(_)));

        let mut leg = TransportLeg::new("truck_heavy", 10.0, 1.0);
        leg.load_factor = Some(0.0);
        let err = transport_emissions(&tables, &leg).expect_err("zero load factor");
        assert!(matches!(err, LcaError::InvalidScenario(_)));
    }

    #[test]
    fn multimodal_prices_every_leg_at_shipment_weight() {
        let tables = builtin_tables().expect("tables");
        let legs = vec![
            TransportLeg::new("truck_heavy", 50.0, 999.0),
            TransportLeg::new("rail_freight", 800.0, 0.0),
        ];
        let chain = multimodal(&tables, &legs, 20.0).expect("chain");
        assert!(chain.legs.iter().all(|leg| leg.weight_tonnes == 20.0));
        assert_eq!(chain.total_distance_km, 850.0);
        let sum: f64 = chain.legs.iter().map(|leg| leg.total_kg_co2e).sum();
        assert_eq!(chain.total_kg_co2e, sum);
        assert_eq!(chain.average_intensity_kg_co2e_per_t_km, sum / (20.0 * 850.0));
    }

    #[test]
    fn logistics_follow_the_recycled_share() {
        let tables = builtin_tables().expect("tables");
        let (_, aluminum) = tables.metal("aluminum").expect("aluminum");
        let options = LogisticsOptions::default();

        let virgin = route_logistics(&tables, aluminum, 1000.0, 0.0, &options).expect("virgin");
        assert_eq!(virgin.total_distance_km, 1100.0);
        assert!(virgin.legs.iter().all(|leg| leg.route == Some(RouteKind::Primary)));
        assert_eq!(virgin.secondary_route_kg_co2e, 0.0);

        let recycled = route_logistics(&tables, aluminum, 1000.0, 1.0, &options).expect("recycled");
        assert_eq!(recycled.total_distance_km, 550.0);
        assert!(recycled.legs.iter().all(|leg| leg.route == Some(RouteKind::Secondary)));
        assert!(recycled.total_kg_co2e < virgin.total_kg_co2e);
        assert!((recycled.total_kg_co2e / virgin.total_kg_co2e - 0.5).abs() < 1e-12);
    }

    #[test]
    fn mixed_route_subtotals_sum_to_total() {
        let tables = builtin_tables().expect("tables");
        let (_, copper) = tables.metal("copper").expect("copper");
        let options = LogisticsOptions::with_mode("rail_freight").with_distance("scrap_collection", 20.0);
        let chain = route_logistics(&tables, copper, 2000.0, 0.25, &options).expect("chain");

        let primary_legs = copper.logistics.primary.len();
        assert_eq!(chain.legs.len(), primary_legs + copper.logistics.secondary.len());
        assert!(chain.legs[..primary_legs].iter().all(|leg| leg.weight_tonnes == 1.5));
        assert!(chain.legs[primary_legs..].iter().all(|leg| leg.weight_tonnes == 0.5));
        let collection = chain
            .legs
            .iter()
            .find(|leg| leg.stage.as_deref() == Some("scrap_collection"))
            .expect("collection leg");
        assert_eq!(collection.distance_km, 20.0);
        assert!(
            (chain.primary_route_kg_co2e + chain.secondary_route_kg_co2e - chain.total_kg_co2e).abs()
                < 1e-9
        );
        let tonne_km: f64 = chain.legs.iter().map(|leg| leg.weight_tonnes * leg.distance_km).sum();
        assert_eq!(chain.average_intensity_kg_co2e_per_t_km, chain.total_kg_co2e / tonne_km);
    }

    #[test]
    fn unknown_logistics_stage_is_rejected() {
        let tables = builtin_tables().expect("tables");
        let (_, copper) = tables.metal("copper").expect("copper");
        let options = LogisticsOptions::default().with_distance("mine_to_refinery", 10.0);
        let err = route_logistics(&tables, copper, 100.0, 0.5, &options).expect_err("aluminum stage");
        assert_eq!(err.code(), "unknown_logistics_stage");
    }

    #[test]
    fn mode_comparison_breaks_ties_by_name() {
        let tables = builtin_tables().expect("tables");
        let modes: Vec<String> = ["truck_heavy", "rail_freight", "coastal_shipping"]
            .iter()
            .map(|m| m.to_string())
            .collect();
        let cmp = compare_modes(&tables, 100.0, 500.0, &modes, true).expect("compare");
        assert_eq!(cmp.best_mode, "coastal_shipping");
        assert_eq!(cmp.worst_mode, "truck_heavy");
        assert!(cmp.reduction_pct > 0.0 && cmp.reduction_pct < 100.0);

        let tied = compare_modes(&tables, 0.0, 500.0, &modes, true).expect("compare");
        assert_eq!(tied.best_mode, "coastal_shipping");
        assert_eq!(tied.worst_mode, "truck_heavy");
        assert_eq!(tied.reduction_pct, 0.0);
    }

    #[test]
    fn corridor_options_skip_modes_without_factors() {
        let tables = builtin_tables().expect("tables");
        let options = route_options(&tables, "Kandla", "mumbai", 25.0, true).expect("corridor");
        assert_eq!(options.comparison.ranking.len(), 3);
        assert_eq!(options.comparison.best_mode, "coastal_shipping");
        let err = route_options(&tables, "mumbai", "atlantis", 1.0, true).expect_err("no corridor");
        assert!(matches!(err, LcaError::UnknownPreset(_)));
    }

    #[test]
    fn long_road_leg_gets_ranked_suggestions() {
        let tables = builtin_tables().expect("tables");
        let leg = TransportLeg::new("truck_light", 1200.0, 10.0);
        let suggestions = transport_suggestions(&tables, &leg).expect("suggestions");
        let categories: Vec<&str> = suggestions.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, ["modal_shift", "load_optimization", "multimodal"]);
    }
}
