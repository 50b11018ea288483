//! Input scenario for a full life-cycle assessment.

use std::collections::BTreeMap;

use mlca_core::errors::{out_of_range, ErrorInfo, LcaError};
use mlca_tables::TableSet;
use serde::{Deserialize, Serialize};

use crate::grid::ElectricityMix;
use crate::process::ProcessOverride;
use crate::recycling::{MaterialEmissionFactors, RecyclingParams};
use crate::transport::{LogisticsOptions, TransportLeg};

/// Grid preset used when a scenario names neither a preset nor a mix.
pub const DEFAULT_GRID_PRESET: &str = "national_average";
/// Largest mass accepted for one scenario, kg.
pub const MAX_MASS_KG: f64 = 1e9;
/// Mode of the default transport leg.
pub const DEFAULT_TRANSPORT_MODE: &str = "truck_heavy";
/// Distance of the default transport leg, km.
pub const DEFAULT_TRANSPORT_DISTANCE_KM: f64 = 100.0;

/// System boundary of the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Extraction through factory gate.
    #[default]
    CradleToGate,
    /// Extraction through end of life.
    CradleToGrave,
    /// Single factory stage; no end-of-life credit.
    GateToGate,
}

impl AnalysisType {
    /// Snake-case label used in metadata.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisType::CradleToGate => "cradle_to_gate",
            AnalysisType::CradleToGrave => "cradle_to_grave",
            AnalysisType::GateToGate => "gate_to_gate",
        }
    }
}

/// Everything the aggregator needs to assess one metal product.
///
/// Percentages are percentages; only `recycled_fraction` is a fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Metal name; aliases such as `al` or `cu` are accepted.
    pub metal_type: String,
    /// Functional mass, kg.
    pub mass_kg: f64,
    /// Share of the mass produced by the secondary route, [0, 1].
    #[serde(default)]
    pub recycled_fraction: f64,
    /// Product type used for lifetime lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    /// Free-form region label recorded in metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Free-form grid scenario label recorded in metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_scenario: Option<String>,
    /// Named electricity mix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_preset: Option<String>,
    /// Explicit electricity mix; exclusive with `grid_preset`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity_mix: Option<ElectricityMix>,
    /// Per-process replacement values.
    #[serde(default)]
    pub process_overrides: BTreeMap<String, ProcessOverride>,
    /// Replacement primary route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_route: Option<Vec<String>>,
    /// Replacement secondary route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_route: Option<Vec<String>>,
    /// Freight legs; all carry the full shipment weight.
    #[serde(default = "Scenario::default_transport")]
    pub transport: Vec<TransportLeg>,
    /// Route-split freight from the metal's logistics stages; replaces `transport`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistics: Option<LogisticsOptions>,
    /// Virgin and secondary emission factors.
    #[serde(default)]
    pub material_factors: MaterialEmissionFactors,
    /// Recycling inputs.
    #[serde(default)]
    pub recycling: RecyclingParams,
    /// Region whose collection efficiency scales the preset collection rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_region: Option<String>,
    /// System boundary.
    #[serde(default)]
    pub analysis_type: AnalysisType,
}

impl Scenario {
    fn default_transport() -> Vec<TransportLeg> {
        vec![TransportLeg::new(
            DEFAULT_TRANSPORT_MODE,
            DEFAULT_TRANSPORT_DISTANCE_KM,
            0.0,
        )]
    }

    /// Scenario with every optional field at its default.
    pub fn new(metal_type: impl Into<String>, mass_kg: f64, recycled_fraction: f64) -> Self {
        Self {
            metal_type: metal_type.into(),
            mass_kg,
            recycled_fraction,
            product_type: None,
            region: None,
            grid_scenario: None,
            grid_preset: None,
            electricity_mix: None,
            process_overrides: BTreeMap::new(),
            primary_route: None,
            secondary_route: None,
            transport: Self::default_transport(),
            logistics: None,
            material_factors: MaterialEmissionFactors::default(),
            recycling: RecyclingParams::default(),
            collection_region: None,
            analysis_type: AnalysisType::default(),
        }
    }

    /// Sets the grid preset.
    pub fn with_grid_preset(mut self, preset: impl Into<String>) -> Self {
        self.grid_preset = Some(preset.into());
        self
    }

    /// Sets the product type.
    pub fn with_product_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = Some(product_type.into());
        self
    }

    /// Replaces the transport chain.
    pub fn with_transport(mut self, legs: Vec<TransportLeg>) -> Self {
        self.transport = legs;
        self
    }

    /// Prices freight from route logistics instead of the transport chain.
    pub fn with_logistics(mut self, options: LogisticsOptions) -> Self {
        self.logistics = Some(options);
        self
    }

    /// Sets the analysis type.
    pub fn with_analysis_type(mut self, analysis_type: AnalysisType) -> Self {
        self.analysis_type = analysis_type;
        self
    }

    /// Checks scalar ranges. Table lookups are checked during aggregation.
    pub fn validate(&self) -> Result<(), LcaError> {
        if !self.mass_kg.is_finite() || self.mass_kg < 0.0 || self.mass_kg > MAX_MASS_KG {
            return Err(out_of_range("mass_kg", self.mass_kg, "[0, 1e9]"));
        }
        let r = self.recycled_fraction;
        if !r.is_finite() || !(0.0..=1.0).contains(&r) {
            return Err(out_of_range("recycled_fraction", r, "[0, 1]"));
        }
        if self.grid_preset.is_some() && self.electricity_mix.is_some() {
            return Err(LcaError::InvalidScenario(
                ErrorInfo::new(
                    "ambiguous_grid",
                    "scenario sets both grid_preset and electricity_mix",
                )
                .with_hint("keep exactly one of the two"),
            ));
        }
        if self.logistics.is_some() && self.transport != Self::default_transport() {
            return Err(LcaError::InvalidScenario(
                ErrorInfo::new(
                    "ambiguous_transport",
                    "scenario sets both logistics and a transport chain",
                )
                .with_hint("drop the transport legs or the logistics block"),
            ));
        }
        Ok(())
    }

    /// Returns the grid label and the electricity mix to price.
    pub fn resolved_mix(&self, tables: &TableSet) -> Result<(String, ElectricityMix), LcaError> {
        match (&self.electricity_mix, &self.grid_preset) {
            (Some(mix), _) => Ok(("custom".to_string(), mix.clone())),
            (None, Some(preset)) => Ok((preset.clone(), tables.grid_preset(preset)?.clone())),
            (None, None) => Ok((
                DEFAULT_GRID_PRESET.to_string(),
                tables.grid_preset(DEFAULT_GRID_PRESET)?.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlca_tables::builtin_tables;

    #[test]
    fn yaml_defaults_fill_optional_fields() {
        let scenario: Scenario = serde_yaml::from_str(
            "metal_type: aluminium\nmass_kg: 500\nrecycled_fraction: 0.4\n",
        )
        .expect("parse");
        assert_eq!(scenario.analysis_type, AnalysisType::CradleToGate);
        assert_eq!(scenario.transport.len(), 1);
        assert_eq!(scenario.transport[0].mode, "truck_heavy");
        assert!(scenario.transport[0].empty_return);
        scenario.validate().expect("valid");
    }

    #[test]
    fn range_checks() {
        assert!(Scenario::new("copper", 10.0, 1.3).validate().is_err());
        assert!(Scenario::new("copper", -1.0, 0.0).validate().is_err());
        assert!(Scenario::new("copper", 2e9, 0.0).validate().is_err());
        assert!(Scenario::new("copper", f64::NAN, 0.0).validate().is_err());
        assert!(Scenario::new("copper", 0.0, 1.0).validate().is_ok());
    }

    #[test]
    fn logistics_replaces_only_the_default_chain() {
        let scenario: Scenario = serde_yaml::from_str(
            "metal_type: aluminum\nmass_kg: 1000\nlogistics:\n  distances_km: { mine_to_refinery: 90 }\n",
        )
        .expect("parse");
        let logistics = scenario.logistics.as_ref().expect("logistics");
        assert_eq!(logistics.mode, "truck_heavy");
        assert!(logistics.empty_return);
        assert_eq!(logistics.distances_km["mine_to_refinery"], 90.0);
        scenario.validate().expect("valid");

        let both = scenario.with_transport(vec![TransportLeg::new("rail_freight", 400.0, 0.0)]);
        assert_eq!(both.validate().expect_err("ambiguous").code(), "ambiguous_transport");
    }

    #[test]
    fn grid_resolution() {
        let tables = builtin_tables().expect("tables");
        let (label, _) = Scenario::new("copper", 1.0, 0.0).resolved_mix(&tables).expect("default");
        assert_eq!(label, DEFAULT_GRID_PRESET);

        let mut both = Scenario::new("copper", 1.0, 0.0).with_grid_preset("southern");
        both.electricity_mix = Some(BTreeMap::from([("coal".to_string(), 100.0)]));
        assert_eq!(both.validate().expect_err("ambiguous").code(), "ambiguous_grid");

        let missing = Scenario::new("copper", 1.0, 0.0).with_grid_preset("lunar");
        assert!(matches!(
            missing.resolved_mix(&tables).expect_err("unknown preset"),
            LcaError::UnknownPreset(_)
        ));
    }
}
