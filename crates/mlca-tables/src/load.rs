use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use mlca_core::errors::{io_error, ErrorInfo, LcaError};
use mlca_core::serde::from_yaml_slice;

use crate::model::{GwpVersion, TableSet};

/// The table resource shipped with the crate.
pub const BUILTIN_TABLES_YAML: &str = include_str!("../data/lca_tables.yaml");

static BUILTIN: OnceLock<Result<Arc<TableSet>, LcaError>> = OnceLock::new();

fn table_error(message: impl Into<String>) -> LcaError {
    LcaError::Table(ErrorInfo::new("table_validate", message))
}

/// Returns the built-in table set, parsing it on first use.
pub fn builtin_tables() -> Result<Arc<TableSet>, LcaError> {
    BUILTIN
        .get_or_init(|| parse_tables(BUILTIN_TABLES_YAML.as_bytes()).map(Arc::new))
        .clone()
}

/// Loads and validates a table set from a YAML file.
pub fn load_tables<P: AsRef<Path>>(path: P) -> Result<TableSet, LcaError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| io_error("tables_read", err))?;
    let tables = parse_tables(&bytes).map_err(|err| match err {
        LcaError::Table(info) => {
            LcaError::Table(info.with_context("path", path.display().to_string()))
        }
        other => other,
    })?;
    tracing::info!(version = %tables.version, path = %path.display(), "loaded constant tables");
    Ok(tables)
}

/// Parses and validates a table set from YAML bytes.
pub fn parse_tables(bytes: &[u8]) -> Result<TableSet, LcaError> {
    let tables: TableSet = from_yaml_slice(bytes)?;
    validate(&tables)?;
    Ok(tables)
}

fn check_non_negative(label: &str, value: f64) -> Result<(), LcaError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(table_error("factor must be finite and non-negative")
            .with_table_context("entry", label)
            .with_table_context("value", value.to_string()))
    }
}

fn check_fraction(label: &str, value: f64) -> Result<(), LcaError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(table_error("fraction must lie in [0, 1]")
            .with_table_context("entry", label)
            .with_table_context("value", value.to_string()))
    }
}

trait TableContext {
    fn with_table_context(self, key: &str, value: impl Into<String>) -> Self;
}

impl TableContext for LcaError {
    fn with_table_context(self, key: &str, value: impl Into<String>) -> Self {
        match self {
            LcaError::Table(info) => LcaError::Table(info.with_context(key, value)),
            other => other,
        }
    }
}

fn validate(tables: &TableSet) -> Result<(), LcaError> {
    if tables.version.trim().is_empty() {
        return Err(table_error("table set must carry a version label"));
    }

    for version in GwpVersion::ALL {
        let gwp = tables.gwp_table(version)?;
        if gwp.get("CO2") != Some(&1.0) {
            return Err(table_error("CO2 must have a GWP of exactly 1")
                .with_table_context("version", version.label()));
        }
        for (gas, factor) in gwp {
            check_non_negative(&format!("gwp.{version}.{gas}"), *factor)?;
        }
    }

    let grid = &tables.grid;
    for (source, factor) in &grid.source_factors {
        check_non_negative(&format!("grid.source_factors.{source}"), *factor)?;
    }
    for source in &grid.renewable_sources {
        if !grid.source_factors.contains_key(source) {
            return Err(table_error("renewable source has no factor")
                .with_table_context("source", source.clone()));
        }
    }
    for (preset, mix) in &grid.presets {
        for (source, share) in mix {
            if !grid.source_factors.contains_key(source) {
                return Err(table_error("grid preset references an unknown source")
                    .with_table_context("preset", preset.clone())
                    .with_table_context("source", source.clone()));
            }
            check_non_negative(&format!("grid.presets.{preset}.{source}"), *share)?;
        }
    }

    for (alias, target) in &tables.metal_aliases {
        if !tables.metals.contains_key(target) {
            return Err(table_error("metal alias points to an unknown metal")
                .with_table_context("alias", alias.clone()));
        }
    }

    for (metal, metal_tables) in &tables.metals {
        if metal_tables.primary_route.is_empty() {
            return Err(table_error("primary route must not be empty")
                .with_table_context("metal", metal.clone()));
        }
        for name in metal_tables
            .primary_route
            .iter()
            .chain(metal_tables.secondary_route.iter())
        {
            if !metal_tables.processes.contains_key(name) {
                return Err(table_error("route references an unknown process")
                    .with_table_context("metal", metal.clone())
                    .with_table_context("process", name.clone()));
            }
        }
        for (name, process) in &metal_tables.processes {
            check_non_negative(
                &format!("{metal}.{name}.energy_intensity"),
                process.energy_intensity_kwh_per_kg,
            )?;
            for (gas, amount) in &process.direct_gases {
                check_non_negative(&format!("{metal}.{name}.{gas}"), *amount)?;
                for version in GwpVersion::ALL {
                    if !tables.gwp_table(version)?.contains_key(gas) {
                        return Err(table_error("direct gas missing from a GWP table")
                            .with_table_context("metal", metal.clone())
                            .with_table_context("process", name.clone())
                            .with_table_context("gas", gas.clone())
                            .with_table_context("version", version.label()));
                    }
                }
            }
        }
        let recycling = &metal_tables.recycling;
        check_fraction(&format!("{metal}.collection_rate"), recycling.collection_rate)?;
        check_fraction(
            &format!("{metal}.recycling_efficiency"),
            recycling.recycling_efficiency,
        )?;
        check_fraction(
            &format!("{metal}.informal_sector_share"),
            recycling.informal_sector_share,
        )?;
        check_fraction(&format!("{metal}.export_share"), recycling.export_share)?;
        check_fraction(
            &format!("{metal}.energy_savings_vs_primary"),
            recycling.energy_savings_vs_primary,
        )?;
        check_fraction(
            &format!("{metal}.emission_reduction_vs_primary"),
            recycling.emission_reduction_vs_primary,
        )?;
        check_non_negative(
            &format!("{metal}.virgin_ef"),
            metal_tables.material_factors.virgin_ef_kg_co2e_per_kg,
        )?;
        for (product, lifetime) in &metal_tables.product_lifetimes {
            check_non_negative(&format!("{metal}.lifetime.{product}"), *lifetime)?;
        }
        let mut stages = BTreeSet::new();
        let logistics = &metal_tables.logistics;
        for entry in logistics.primary.iter().chain(&logistics.secondary) {
            check_non_negative(
                &format!("{metal}.logistics.{}", entry.stage),
                entry.distance_km,
            )?;
            if !stages.insert(entry.stage.as_str()) {
                return Err(table_error("logistics stage listed more than once")
                    .with_table_context("metal", metal.clone())
                    .with_table_context("stage", entry.stage.clone()));
            }
        }
    }

    let transport = &tables.transport;
    check_non_negative("transport.empty_return_multiplier", transport.empty_return_multiplier)?;
    check_load_factor("transport.default_load_factor", transport.default_load_factor)?;
    for (mode, entry) in &transport.modes {
        check_non_negative(&format!("transport.{mode}.emission_factor"), entry.emission_factor)?;
        if let Some(load_factor) = entry.load_factor {
            check_load_factor(&format!("transport.{mode}.load_factor"), load_factor)?;
        }
    }
    for (key, mode) in &transport.corridor_modes {
        if !transport.modes.contains_key(mode) {
            return Err(table_error("corridor mode maps to an unknown transport mode")
                .with_table_context("corridor_mode", key.clone()));
        }
    }
    for corridor in &transport.corridors {
        for (key, distance) in &corridor.distances_km {
            check_non_negative(
                &format!("corridor.{}-{}.{key}", corridor.origin, corridor.destination),
                *distance,
            )?;
        }
    }

    let recycling = &tables.recycling;
    check_fraction(
        "recycling.reference_collection_efficiency",
        recycling.reference_collection_efficiency,
    )?;
    if recycling.reference_collection_efficiency == 0.0 {
        return Err(table_error("reference collection efficiency must be positive"));
    }
    for (region, efficiency) in &recycling.regional_collection_efficiency {
        check_fraction(&format!("recycling.region.{region}"), *efficiency)?;
    }
    if recycling.lifetime_normalization_years <= 0.0 {
        return Err(table_error("lifetime normalisation must be positive"));
    }
    let weights = &recycling.circularity_weights;
    let weight_sum = weights.secondary_share + weights.eol_recovery + weights.lifetime;
    if (weight_sum - 1.0).abs() > 1e-9 {
        return Err(table_error("circularity weights must sum to 1")
            .with_table_context("sum", weight_sum.to_string()));
    }
    if recycling
        .grade_thresholds
        .windows(2)
        .any(|pair| pair[0].min_index < pair[1].min_index)
    {
        return Err(table_error("grade thresholds must be ordered highest first"));
    }

    let uncertainty = &tables.uncertainty;
    check_non_negative("uncertainty.primary_cv", uncertainty.primary_cv)?;
    check_non_negative("uncertainty.secondary_cv", uncertainty.secondary_cv)?;
    check_non_negative("uncertainty.transport_cv", uncertainty.transport_cv)?;
    Ok(())
}

fn check_load_factor(label: &str, value: f64) -> Result<(), LcaError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(table_error("load factor must lie in (0, 1]")
            .with_table_context("entry", label)
            .with_table_context("value", value.to_string()))
    }
}
