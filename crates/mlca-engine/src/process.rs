//! Per-process emissions (energy × grid factor + direct gases), route chains,
//! primary/secondary comparison and energy-intensity sensitivity.

use std::collections::BTreeMap;

use mlca_core::errors::{out_of_range, ErrorInfo, LcaError};
use mlca_core::numeric::{percent_of, ratio_or_zero};
use mlca_core::warnings::DataQualityWarning;
use mlca_tables::{GwpVersion, MetalTables, TableSet};
use serde::{Deserialize, Serialize};

use crate::gwp::{gas_breakdown, GasAmount};

/// Immutable description of one production process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Process identifier.
    pub process_name: String,
    /// Canonical metal name.
    pub metal_type: String,
    /// Electricity demand, kWh per kg.
    pub energy_intensity_kwh_per_kg: f64,
    /// Direct gases, kg per kg of output.
    #[serde(default)]
    pub direct_process_gases: GasAmount,
}

/// Caller-supplied replacement values for a tabulated process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProcessOverride {
    /// Replacement energy intensity, kWh per kg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_intensity_kwh_per_kg: Option<f64>,
    /// Replacement direct-gas inventory, kg per kg.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_process_gases: Option<GasAmount>,
}

impl ProcessSpec {
    /// Looks a process up in the metal's table.
    pub fn from_table(tables: &TableSet, metal: &str, process: &str) -> Result<Self, LcaError> {
        let (canonical, metal_tables) = tables.metal(metal)?;
        Self::from_metal_tables(&canonical, metal_tables, process)
    }

    fn from_metal_tables(
        metal: &str,
        metal_tables: &MetalTables,
        process: &str,
    ) -> Result<Self, LcaError> {
        let entry = metal_tables.processes.get(process).ok_or_else(|| {
            LcaError::UnknownProcess(
                ErrorInfo::new("unknown_process", "process is not tabulated for this metal")
                    .with_context("metal_type", metal)
                    .with_context("process", process),
            )
        })?;
        Ok(Self {
            process_name: process.to_string(),
            metal_type: metal.to_string(),
            energy_intensity_kwh_per_kg: entry.energy_intensity_kwh_per_kg,
            direct_process_gases: entry.direct_gases.clone(),
        })
    }

    /// Returns a copy with the override applied.
    pub fn with_override(&self, patch: &ProcessOverride) -> Self {
        Self {
            energy_intensity_kwh_per_kg: patch
                .energy_intensity_kwh_per_kg
                .unwrap_or(self.energy_intensity_kwh_per_kg),
            direct_process_gases: patch
                .direct_process_gases
                .clone()
                .unwrap_or_else(|| self.direct_process_gases.clone()),
            ..self.clone()
        }
    }

    /// Returns a copy with the energy intensity scaled by `factor`.
    pub fn scaled_energy(&self, factor: f64) -> Self {
        Self {
            energy_intensity_kwh_per_kg: self.energy_intensity_kwh_per_kg * factor,
            ..self.clone()
        }
    }

    fn validate(&self) -> Result<(), LcaError> {
        let ei = self.energy_intensity_kwh_per_kg;
        if !ei.is_finite() || ei < 0.0 {
            return Err(out_of_range(
                &format!("{}.energy_intensity_kwh_per_kg", self.process_name),
                ei,
                "[0, inf)",
            ));
        }
        for (gas, amount) in &self.direct_process_gases {
            if !amount.is_finite() || *amount < 0.0 {
                return Err(out_of_range(
                    &format!("{}.direct_process_gases.{gas}", self.process_name),
                    *amount,
                    "[0, inf)",
                ));
            }
        }
        Ok(())
    }
}

/// Resolves an ordered route of process names into specs, applying overrides.
pub fn resolve_route(
    tables: &TableSet,
    metal: &str,
    names: &[String],
    overrides: &BTreeMap<String, ProcessOverride>,
) -> Result<Vec<ProcessSpec>, LcaError> {
    let (canonical, metal_tables) = tables.metal(metal)?;
    names
        .iter()
        .map(|name| {
            let spec = ProcessSpec::from_metal_tables(&canonical, metal_tables, name)?;
            Ok(match overrides.get(name) {
                Some(patch) => spec.with_override(patch),
                None => spec,
            })
        })
        .collect()
}

/// Emissions of a single process at a given mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEmissions {
    /// Process identifier.
    pub process_name: String,
    /// Mass processed, kg.
    pub mass_kg: f64,
    /// Electricity consumed, kWh.
    pub energy_kwh: f64,
    /// Grid factor applied, kg CO2e/kWh.
    pub grid_factor: f64,
    /// Emissions from electricity, kg CO2e.
    pub electricity_kg_co2e: f64,
    /// Emissions from direct process gases, kg CO2e.
    pub direct_kg_co2e: f64,
    /// Electricity plus direct, kg CO2e.
    pub total_kg_co2e: f64,
    /// Total per kg processed; 0 at zero mass.
    pub intensity_per_kg: f64,
    /// Direct emissions per gas, kg CO2e.
    pub direct_gas_breakdown: BTreeMap<String, f64>,
}

fn check_mass(mass_kg: f64) -> Result<(), LcaError> {
    if mass_kg.is_finite() && mass_kg >= 0.0 {
        Ok(())
    } else {
        Err(out_of_range("mass_kg", mass_kg, "[0, inf)"))
    }
}

fn check_grid_factor(grid_factor: f64) -> Result<(), LcaError> {
    if grid_factor.is_finite() && grid_factor >= 0.0 {
        Ok(())
    } else {
        Err(out_of_range("grid_factor", grid_factor, "[0, inf)"))
    }
}

/// `mass × (EI × grid_factor + Σ gas × GWP)` for one process.
pub fn process_emissions(
    tables: &TableSet,
    spec: &ProcessSpec,
    mass_kg: f64,
    grid_factor: f64,
    gwp: GwpVersion,
) -> Result<ProcessEmissions, LcaError> {
    check_mass(mass_kg)?;
    check_grid_factor(grid_factor)?;
    spec.validate()?;

    let per_kg = gas_breakdown(tables, &spec.direct_process_gases, gwp)?;
    let direct_gas_breakdown: BTreeMap<String, f64> = per_kg
        .into_iter()
        .map(|(gas, co2e)| (gas, co2e * mass_kg))
        .collect();
    let energy_kwh = spec.energy_intensity_kwh_per_kg * mass_kg;
    let electricity = energy_kwh * grid_factor;
    let direct: f64 = direct_gas_breakdown.values().sum();
    let total = electricity + direct;

    Ok(ProcessEmissions {
        process_name: spec.process_name.clone(),
        mass_kg,
        energy_kwh,
        grid_factor,
        electricity_kg_co2e: electricity,
        direct_kg_co2e: direct,
        total_kg_co2e: total,
        intensity_per_kg: ratio_or_zero(total, mass_kg),
        direct_gas_breakdown,
    })
}

/// Summed emissions of an ordered production route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEmissions {
    /// Per-process results in route order.
    pub processes: Vec<ProcessEmissions>,
    /// Mass pushed through every process, kg.
    pub mass_kg: f64,
    /// Electricity emissions, kg CO2e.
    pub electricity_kg_co2e: f64,
    /// Direct-gas emissions, kg CO2e.
    pub direct_kg_co2e: f64,
    /// Route total, kg CO2e.
    pub total_kg_co2e: f64,
    /// Electricity consumed, kWh.
    pub total_energy_kwh: f64,
    /// kg CO2e per kg; 0 at zero mass.
    pub intensity_per_kg: f64,
    /// kWh per kg; 0 at zero mass.
    pub energy_intensity_kwh_per_kg: f64,
}

/// Runs every process of a route at the same mass and sums the results.
pub fn chain_emissions(
    tables: &TableSet,
    route: &[ProcessSpec],
    mass_kg: f64,
    grid_factor: f64,
    gwp: GwpVersion,
) -> Result<ChainEmissions, LcaError> {
    check_mass(mass_kg)?;
    let processes = route
        .iter()
        .map(|spec| process_emissions(tables, spec, mass_kg, grid_factor, gwp))
        .collect::<Result<Vec<_>, _>>()?;

    let electricity: f64 = processes.iter().map(|p| p.electricity_kg_co2e).sum();
    let direct: f64 = processes.iter().map(|p| p.direct_kg_co2e).sum();
    let total: f64 = processes.iter().map(|p| p.total_kg_co2e).sum();
    let energy: f64 = processes.iter().map(|p| p.energy_kwh).sum();

    Ok(ChainEmissions {
        processes,
        mass_kg,
        electricity_kg_co2e: electricity,
        direct_kg_co2e: direct,
        total_kg_co2e: total,
        total_energy_kwh: energy,
        intensity_per_kg: ratio_or_zero(total, mass_kg),
        energy_intensity_kwh_per_kg: ratio_or_zero(energy, mass_kg),
    })
}

/// Primary route versus secondary route at equal mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteComparison {
    /// Primary route result.
    pub primary: ChainEmissions,
    /// Secondary route result.
    pub secondary: ChainEmissions,
    /// `primary − secondary`, kg CO2e.
    pub emission_savings_kg_co2e: f64,
    /// Savings relative to primary, percent.
    pub emission_reduction_pct: f64,
    /// `primary − secondary`, kWh.
    pub energy_savings_kwh: f64,
    /// Energy savings relative to primary, percent.
    pub energy_reduction_pct: f64,
    /// Findings such as a secondary route exceeding the primary route.
    #[serde(default)]
    pub warnings: Vec<DataQualityWarning>,
}

/// Compares two explicit routes.
pub fn compare_routes(
    tables: &TableSet,
    primary: &[ProcessSpec],
    secondary: &[ProcessSpec],
    mass_kg: f64,
    grid_factor: f64,
    gwp: GwpVersion,
) -> Result<RouteComparison, LcaError> {
    let primary = chain_emissions(tables, primary, mass_kg, grid_factor, gwp)?;
    let secondary = chain_emissions(tables, secondary, mass_kg, grid_factor, gwp)?;
    let savings = primary.total_kg_co2e - secondary.total_kg_co2e;
    let energy_savings = primary.total_energy_kwh - secondary.total_energy_kwh;

    let mut warnings = Vec::new();
    if savings < 0.0 {
        warnings.push(
            DataQualityWarning::new(
                "secondary_exceeds_primary",
                "secondary route emits more than the primary route",
            )
            .with_context("primary_kg_co2e", primary.total_kg_co2e.to_string())
            .with_context("secondary_kg_co2e", secondary.total_kg_co2e.to_string()),
        );
    }

    Ok(RouteComparison {
        emission_savings_kg_co2e: savings,
        emission_reduction_pct: percent_of(savings, primary.total_kg_co2e),
        energy_savings_kwh: energy_savings,
        energy_reduction_pct: percent_of(energy_savings, primary.total_energy_kwh),
        primary,
        secondary,
        warnings,
    })
}

/// Compares the metal's tabulated primary and secondary routes.
pub fn compare_primary_secondary(
    tables: &TableSet,
    metal: &str,
    mass_kg: f64,
    grid_factor: f64,
    gwp: GwpVersion,
) -> Result<RouteComparison, LcaError> {
    let (canonical, metal_tables) = tables.metal(metal)?;
    let none = BTreeMap::new();
    let primary = resolve_route(tables, &canonical, &metal_tables.primary_route, &none)?;
    let secondary = resolve_route(tables, &canonical, &metal_tables.secondary_route, &none)?;
    compare_routes(tables, &primary, &secondary, mass_kg, grid_factor, gwp)
}

/// Energy-intensity sensitivity of a single process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensitivity {
    /// Process identifier.
    pub process_name: String,
    /// Perturbation applied in each direction, percent.
    pub variation_pct: f64,
    /// Emissions at the tabulated intensity, kg CO2e.
    pub base_kg_co2e: f64,
    /// Emissions at `EI × (1 + v)`, kg CO2e.
    pub high_kg_co2e: f64,
    /// Emissions at `EI × (1 − v)`, kg CO2e.
    pub low_kg_co2e: f64,
    /// `high − low`, kg CO2e.
    pub emission_delta_kg_co2e: f64,
    /// kg CO2e per percent of intensity change.
    pub sensitivity_kg_per_pct: f64,
    /// Δemissions% / Δparameter%; 0 when base emissions are 0.
    pub sensitivity_coefficient: f64,
}

/// Default perturbation, percent.
pub const DEFAULT_SENSITIVITY_VARIATION_PCT: f64 = 20.0;

/// Perturbs the energy intensity by `± variation_pct` and reports the response.
pub fn energy_intensity_sensitivity(
    tables: &TableSet,
    spec: &ProcessSpec,
    mass_kg: f64,
    grid_factor: f64,
    gwp: GwpVersion,
    variation_pct: f64,
) -> Result<Sensitivity, LcaError> {
    if !variation_pct.is_finite() || variation_pct <= 0.0 || variation_pct > 100.0 {
        return Err(out_of_range("variation_pct", variation_pct, "(0, 100]"));
    }
    let fraction = variation_pct / 100.0;
    let base = process_emissions(tables, spec, mass_kg, grid_factor, gwp)?.total_kg_co2e;
    let high_spec = spec.scaled_energy(1.0 + fraction);
    let low_spec = spec.scaled_energy(1.0 - fraction);
    let high = process_emissions(tables, &high_spec, mass_kg, grid_factor, gwp)?.total_kg_co2e;
    let low = process_emissions(tables, &low_spec, mass_kg, grid_factor, gwp)?.total_kg_co2e;
    let delta = high - low;
    let span = 2.0 * variation_pct;

    Ok(Sensitivity {
        process_name: spec.process_name.clone(),
        variation_pct,
        base_kg_co2e: base,
        high_kg_co2e: high,
        low_kg_co2e: low,
        emission_delta_kg_co2e: delta,
        sensitivity_kg_per_pct: delta / span,
        sensitivity_coefficient: percent_of(delta, base) / span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlca_tables::builtin_tables;
    use proptest::prelude::*;

    const NATIONAL_GRID: f64 = 0.596056;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn chain_totals_sum_their_processes(
            metal in prop::sample::select(vec!["aluminum", "copper"]),
            take in 1usize..=16,
            mass in 0.0f64..1e6,
            grid in 0.0f64..1.5,
            gwp in prop::sample::select(GwpVersion::ALL.to_vec()),
        ) {
            let tables = builtin_tables().expect("tables");
            let (_, metal_tables) = tables.metal(metal).expect("metal");
            let names: Vec<String> = metal_tables
                .processes
                .keys()
                .take(take.min(metal_tables.processes.len()))
                .cloned()
                .collect();
            let route = resolve_route(&tables, metal, &names, &BTreeMap::new()).expect("route");
            let chain = chain_emissions(&tables, &route, mass, grid, gwp).expect("chain");

            prop_assert_eq!(chain.processes.len(), names.len());
            let total: f64 = chain.processes.iter().map(|p| p.total_kg_co2e).sum();
            let energy: f64 = chain.processes.iter().map(|p| p.energy_kwh).sum();
            prop_assert!(close(chain.total_kg_co2e, total));
            prop_assert!(close(chain.total_energy_kwh, energy));
            prop_assert!(close(chain.electricity_kg_co2e + chain.direct_kg_co2e, chain.total_kg_co2e));
            for (process, name) in chain.processes.iter().zip(&names) {
                prop_assert_eq!(&process.process_name, name);
                prop_assert!(close(process.electricity_kg_co2e + process.direct_kg_co2e, process.total_kg_co2e));
            }
        }
    }

    #[test]
    fn smelting_emissions_follow_formula() {
        let tables = builtin_tables().expect("tables");
        let spec = ProcessSpec::from_table(&tables, "aluminum", "primary_smelting").expect("spec");
        let result =
            process_emissions(&tables, &spec, 1000.0, NATIONAL_GRID, GwpVersion::Ar5).expect("emissions");
        let expected_direct = 1000.0 * (1.65 + 0.0008 * 6630.0 + 0.00012 * 11100.0);
        assert!((result.electricity_kg_co2e - 13.8 * 1000.0 * NATIONAL_GRID).abs() < 1e-6);
        assert!((result.direct_kg_co2e - expected_direct).abs() < 1e-6);
        assert_eq!(result.total_kg_co2e, result.electricity_kg_co2e + result.direct_kg_co2e);
        assert_eq!(result.intensity_per_kg, result.total_kg_co2e / 1000.0);
    }

    #[test]
    fn zero_mass_has_zero_intensity() {
        let tables = builtin_tables().expect("tables");
        let spec = ProcessSpec::from_table(&tables, "copper", "smelting").expect("spec");
        let result = process_emissions(&tables, &spec, 0.0, NATIONAL_GRID, GwpVersion::Ar6).expect("emissions");
        assert_eq!(result.total_kg_co2e, 0.0);
        assert_eq!(result.intensity_per_kg, 0.0);
    }

    #[test]
    fn unknown_process_is_an_error() {
        let tables = builtin_tables().expect("tables");
        let err = ProcessSpec::from_table(&tables, "copper", "anodising").expect_err("unknown");
        assert!(matches!(err, LcaError::UnknownProcess(_)));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let tables = builtin_tables().expect("tables");
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "primary_smelting".to_string(),
            ProcessOverride {
                energy_intensity_kwh_per_kg: Some(12.0),
                direct_process_gases: None,
            },
        );
        let route = resolve_route(
            &tables,
            "aluminium",
            &["primary_smelting".to_string(), "casting_rolling".to_string()],
            &overrides,
        )
        .expect("route");
        assert_eq!(route[0].energy_intensity_kwh_per_kg, 12.0);
        assert_eq!(route[0].direct_process_gases["CF4"], 0.0008);
        assert_eq!(route[1].energy_intensity_kwh_per_kg, 1.2);
        assert_eq!(route[0].metal_type, "aluminum");
    }

    #[test]
    fn secondary_route_is_cleaner_for_tabulated_metals() {
        let tables = builtin_tables().expect("tables");
        for metal in tables.metals.keys() {
            for gwp in GwpVersion::ALL {
                let cmp = compare_primary_secondary(&tables, metal, 1000.0, NATIONAL_GRID, gwp)
                    .expect("compare");
                assert!(cmp.secondary.total_kg_co2e <= cmp.primary.total_kg_co2e, "{metal}");
                assert!(cmp.emission_reduction_pct > 0.0);
                assert!(cmp.energy_savings_kwh > 0.0);
                assert!(cmp.warnings.is_empty());
            }
        }
    }

    #[test]
    fn inverted_routes_raise_a_warning() {
        let tables = builtin_tables().expect("tables");
        let smelting = ProcessSpec::from_table(&tables, "aluminum", "primary_smelting").expect("spec");
        let remelt = ProcessSpec::from_table(&tables, "aluminum", "secondary_smelting").expect("spec");
        let cmp = compare_routes(&tables, &[remelt], &[smelting], 10.0, NATIONAL_GRID, GwpVersion::Ar5)
            .expect("compare");
        assert_eq!(cmp.warnings[0].code, "secondary_exceeds_primary");
    }

    #[test]
    fn sensitivity_is_symmetric_for_linear_model() {
        let tables = builtin_tables().expect("tables");
        let spec = ProcessSpec::from_table(&tables, "aluminum", "alumina_refining").expect("spec");
        let result = energy_intensity_sensitivity(
            &tables,
            &spec,
            100.0,
            NATIONAL_GRID,
            GwpVersion::Ar5,
            DEFAULT_SENSITIVITY_VARIATION_PCT,
        )
        .expect("sensitivity");
        let electricity = 3.2 * 100.0 * NATIONAL_GRID;
        assert!((result.emission_delta_kg_co2e - 0.4 * electricity).abs() < 1e-9);
        let expected = (0.4 * electricity / result.base_kg_co2e * 100.0) / 40.0;
        assert!((result.sensitivity_coefficient - expected).abs() < 1e-12);
        assert!(result.sensitivity_coefficient < 1.0);
    }

    #[test]
    fn sensitivity_rejects_bad_variation() {
        let tables = builtin_tables().expect("tables");
        let spec = ProcessSpec::from_table(&tables, "copper", "refining").expect("spec");
        for variation in [0.0, -5.0, 150.0, f64::NAN] {
            let err = energy_intensity_sensitivity(&tables, &spec, 1.0, NATIONAL_GRID, GwpVersion::Ar5, variation)
                .expect_err("bad variation");
            assert!(matches!(err, LcaError::InvalidScenario(_)));
        }
    }
}
