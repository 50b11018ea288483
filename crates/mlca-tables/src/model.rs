//! Typed view of the constant-table resource.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use mlca_core::errors::{ErrorInfo, LcaError};
use mlca_core::hash::stable_hash_string;
use serde::{Deserialize, Serialize};

/// IPCC assessment-report revision selecting a GWP-100 table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GwpVersion {
    /// Fifth Assessment Report (2013) values.
    #[serde(rename = "AR5")]
    Ar5,
    /// Sixth Assessment Report (2021) values.
    #[serde(rename = "AR6")]
    Ar6,
}

impl GwpVersion {
    /// Every version the engine knows about, in table order.
    pub const ALL: [GwpVersion; 2] = [GwpVersion::Ar5, GwpVersion::Ar6];

    /// Returns the canonical label (`AR5`, `AR6`).
    pub fn label(&self) -> &'static str {
        match self {
            GwpVersion::Ar5 => "AR5",
            GwpVersion::Ar6 => "AR6",
        }
    }
}

impl fmt::Display for GwpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GwpVersion {
    type Err = LcaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AR5" => Ok(GwpVersion::Ar5),
            "AR6" => Ok(GwpVersion::Ar6),
            other => Err(LcaError::InvalidScenario(
                ErrorInfo::new("unknown_gwp_version", "GWP version must be AR5 or AR6")
                    .with_context("version", other),
            )),
        }
    }
}

/// Grid source factors and named mixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridTables {
    /// Accepted deviation of the share total from 100, in percentage points.
    pub share_tolerance_pct: f64,
    /// Decimal places kept on computed grid factors.
    pub factor_precision: u32,
    /// Lifecycle emission factor per source, kg CO2e/kWh.
    pub source_factors: BTreeMap<String, f64>,
    /// Sources counted toward the renewable share.
    pub renewable_sources: Vec<String>,
    /// Named electricity mixes (percent shares).
    pub presets: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Energy intensity and direct gases of a single process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntry {
    /// Electricity demand, kWh per kg of output.
    pub energy_intensity_kwh_per_kg: f64,
    /// Direct process gases, kg per kg of output.
    #[serde(default)]
    pub direct_gases: BTreeMap<String, f64>,
}

/// Recycling presets for one metal (fractions in [0, 1]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalRecycling {
    /// Share of end-of-life material collected.
    pub collection_rate: f64,
    /// Share of collected material recovered by recyclers.
    pub recycling_efficiency: f64,
    /// Share of recycling handled by the informal sector.
    pub informal_sector_share: f64,
    /// Share of scrap exported.
    pub export_share: f64,
    /// Energy saved by secondary production relative to primary.
    pub energy_savings_vs_primary: f64,
    /// Emissions avoided by secondary production relative to primary.
    pub emission_reduction_vs_primary: f64,
}

/// Default material emission factors for one metal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialFactors {
    /// Emission factor of virgin metal, kg CO2e/kg.
    pub virgin_ef_kg_co2e_per_kg: f64,
}

/// Linear proxy factors for non-climate impact categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactFactors {
    /// kg SO2-eq per kg CO2e.
    pub acidification_kg_so2_eq_per_kg_co2e: f64,
    /// kg PO4-eq per kg CO2e.
    pub eutrophication_kg_po4_eq_per_kg_co2e: f64,
    /// kg CFC-11-eq per kg CO2e.
    pub ozone_depletion_kg_cfc11_eq_per_kg_co2e: f64,
    /// m³ of water per kg of metal.
    pub water_m3_per_kg_metal: f64,
    /// m²·year of land occupation per kg of metal.
    pub land_use_m2_year_per_kg_metal: f64,
}

/// One typical freight stage of a production route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticsStage {
    /// Stage identifier (e.g. `mine_to_refinery`).
    pub stage: String,
    /// Typical distance, km.
    pub distance_km: f64,
}

/// Typical freight stages of both production routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RouteLogistics {
    /// Stages moving primary metal, in route order.
    #[serde(default)]
    pub primary: Vec<LogisticsStage>,
    /// Stages moving scrap and secondary metal, in route order.
    #[serde(default)]
    pub secondary: Vec<LogisticsStage>,
}

impl RouteLogistics {
    /// Returns true when either route lists `stage`.
    pub fn has_stage(&self, stage: &str) -> bool {
        self.primary
            .iter()
            .chain(&self.secondary)
            .any(|entry| entry.stage == stage)
    }
}

/// Every table keyed to a single metal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalTables {
    /// Process catalogue.
    pub processes: BTreeMap<String, ProcessEntry>,
    /// Ordered primary production route.
    pub primary_route: Vec<String>,
    /// Ordered secondary (recycled) production route.
    pub secondary_route: Vec<String>,
    /// Recycling presets.
    pub recycling: MetalRecycling,
    /// Default material emission factors.
    pub material_factors: MaterialFactors,
    /// Typical freight stages per production route.
    #[serde(default)]
    pub logistics: RouteLogistics,
    /// Typical product lifetimes in years.
    #[serde(default)]
    pub product_lifetimes: BTreeMap<String, f64>,
    /// Impact-category proxy factors.
    pub impact_factors: ImpactFactors,
}

/// Freight mode family, used to decide whether empty returns apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeCategory {
    /// Road freight; subject to the empty-return multiplier.
    Road,
    /// Rail freight.
    Rail,
    /// Coastal and inland waterways.
    Water,
    /// Combined road/rail/water service.
    Multimodal,
    /// Pipeline transport.
    Pipeline,
}

/// Emission factor and typical loading of one freight mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportMode {
    /// kg CO2e per tonne-km at full load.
    pub emission_factor: f64,
    /// Typical load factor; falls back to the table default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_factor: Option<f64>,
    /// Mode family.
    pub category: ModeCategory,
}

/// Freight corridor with per-mode distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    /// Origin city.
    pub origin: String,
    /// Destination city.
    pub destination: String,
    /// Distance per corridor mode key (`road`, `rail`, `coastal`).
    pub distances_km: BTreeMap<String, f64>,
}

/// Freight tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportTables {
    /// Load factor applied to modes without a tabulated value.
    pub default_load_factor: f64,
    /// Multiplier applied to road legs that return empty.
    pub empty_return_multiplier: f64,
    /// Mode catalogue.
    pub modes: BTreeMap<String, TransportMode>,
    /// Corridor mode key to catalogue mode.
    #[serde(default)]
    pub corridor_modes: BTreeMap<String, String>,
    /// Freight corridors.
    #[serde(default)]
    pub corridors: Vec<Corridor>,
}

impl TransportTables {
    /// Looks up a corridor in either direction.
    pub fn corridor(&self, origin: &str, destination: &str) -> Option<&Corridor> {
        let origin = origin.trim().to_ascii_lowercase();
        let destination = destination.trim().to_ascii_lowercase();
        self.corridors.iter().find(|corridor| {
            (corridor.origin == origin && corridor.destination == destination)
                || (corridor.origin == destination && corridor.destination == origin)
        })
    }
}

/// Use-phase loss model: `min(base + per_year × lifetime, cap)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseLossModel {
    /// Loss fraction at zero lifetime.
    pub base: f64,
    /// Additional loss fraction per year of service.
    pub per_year: f64,
    /// Upper bound on the loss fraction.
    pub cap: f64,
}

impl UseLossModel {
    /// Loss fraction for a product lifetime in years.
    pub fn losses_for(&self, lifetime_years: f64) -> f64 {
        (self.base + self.per_year * lifetime_years).min(self.cap)
    }
}

/// Weights of the circularity index components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularityWeights {
    /// Weight of the material secondary share.
    pub secondary_share: f64,
    /// Weight of end-of-life recovery.
    pub eol_recovery: f64,
    /// Weight of the normalised product lifetime.
    pub lifetime: f64,
}

/// Minimum circularity index for a letter grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeThreshold {
    /// Letter grade.
    pub grade: String,
    /// Inclusive lower bound on the index.
    pub min_index: f64,
}

/// Metal-independent recycling tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecyclingTables {
    /// Collection efficiency the metal presets were calibrated against.
    pub reference_collection_efficiency: f64,
    /// Collection efficiency per region.
    pub regional_collection_efficiency: BTreeMap<String, f64>,
    /// Regions flagged for infrastructure recommendations.
    #[serde(default)]
    pub low_infrastructure_regions: Vec<String>,
    /// Lifetime used when the product type is not tabulated.
    pub default_product_lifetime_years: f64,
    /// Lifetime at which the durability score saturates.
    pub lifetime_normalization_years: f64,
    /// Use-phase loss model.
    pub use_losses: UseLossModel,
    /// Circularity index weights.
    pub circularity_weights: CircularityWeights,
    /// Grade thresholds, highest first; anything below the last is `F`.
    pub grade_thresholds: Vec<GradeThreshold>,
}

/// Coefficients of variation for uncertainty propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyTables {
    /// CV of primary-route emissions.
    pub primary_cv: f64,
    /// CV of secondary-route emissions.
    pub secondary_cv: f64,
    /// CV of transport emissions.
    pub transport_cv: f64,
}

/// Content hash memoised per table value; clones start empty.
#[derive(Debug, Default)]
struct DigestCache(OnceLock<String>);

impl Clone for DigestCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for DigestCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Complete, immutable constant-table set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSet {
    /// Version label recorded in every result.
    pub version: String,
    /// Free-form description of the sources.
    #[serde(default)]
    pub description: String,
    /// GWP-100 factors per assessment report.
    pub gwp: BTreeMap<GwpVersion, BTreeMap<String, f64>>,
    /// Grid tables.
    pub grid: GridTables,
    /// Alternative metal spellings mapped to canonical names.
    #[serde(default)]
    pub metal_aliases: BTreeMap<String, String>,
    /// Per-metal tables keyed by canonical name.
    pub metals: BTreeMap<String, MetalTables>,
    /// Freight tables.
    pub transport: TransportTables,
    /// Recycling tables.
    pub recycling: RecyclingTables,
    /// Uncertainty coefficients.
    pub uncertainty: UncertaintyTables,
    #[serde(skip)]
    digest: DigestCache,
}

impl TableSet {
    /// Content hash over the canonical JSON form of the tables.
    ///
    /// Computed on first call and reused; a set must not be mutated after it
    /// has been hashed.
    pub fn content_hash(&self) -> Result<String, LcaError> {
        if let Some(hash) = self.digest.0.get() {
            return Ok(hash.clone());
        }
        let hash = stable_hash_string(self)?;
        Ok(self.digest.0.get_or_init(|| hash).clone())
    }

    /// Returns the GWP table for a version.
    pub fn gwp_table(&self, version: GwpVersion) -> Result<&BTreeMap<String, f64>, LcaError> {
        self.gwp.get(&version).ok_or_else(|| {
            LcaError::Table(
                ErrorInfo::new("gwp_version_missing", "table set lacks the requested GWP version")
                    .with_context("version", version.label()),
            )
        })
    }

    /// Normalises a metal name through the alias map.
    pub fn canonical_metal(&self, metal: &str) -> Result<String, LcaError> {
        let key = metal.trim().to_ascii_lowercase();
        let canonical = self.metal_aliases.get(&key).cloned().unwrap_or(key);
        if self.metals.contains_key(&canonical) {
            Ok(canonical)
        } else {
            Err(LcaError::InvalidScenario(
                ErrorInfo::new("unknown_metal", "metal type is not modelled")
                    .with_context("metal_type", metal)
                    .with_hint(format!(
                        "expected one of: {}",
                        self.metals.keys().cloned().collect::<Vec<_>>().join(", ")
                    )),
            ))
        }
    }

    /// Returns the canonical name and tables of a metal.
    pub fn metal(&self, metal: &str) -> Result<(String, &MetalTables), LcaError> {
        let canonical = self.canonical_metal(metal)?;
        let tables = self.metals.get(&canonical).ok_or_else(|| {
            LcaError::InvalidScenario(
                ErrorInfo::new("unknown_metal", "metal type is not modelled")
                    .with_context("metal_type", metal),
            )
        })?;
        Ok((canonical, tables))
    }

    /// Returns a named electricity mix.
    pub fn grid_preset(&self, name: &str) -> Result<&BTreeMap<String, f64>, LcaError> {
        self.grid.presets.get(name).ok_or_else(|| {
            LcaError::UnknownPreset(
                ErrorInfo::new("unknown_grid_preset", "grid preset not found")
                    .with_context("preset", name),
            )
        })
    }

    /// Returns a freight mode.
    pub fn transport_mode(&self, mode: &str) -> Result<&TransportMode, LcaError> {
        self.transport.modes.get(mode).ok_or_else(|| {
            LcaError::UnknownTransportMode(
                ErrorInfo::new("unknown_transport_mode", "transport mode not found")
                    .with_context("mode", mode),
            )
        })
    }

    /// Typical lifetime of a product, falling back to the table default.
    pub fn product_lifetime(&self, metal: &MetalTables, product_type: Option<&str>) -> f64 {
        product_type
            .and_then(|product| metal.product_lifetimes.get(product))
            .copied()
            .unwrap_or(self.recycling.default_product_lifetime_years)
    }
}
