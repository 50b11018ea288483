//! Gas mass to CO2-equivalent conversion.

use std::collections::BTreeMap;

use mlca_core::errors::{ErrorInfo, LcaError};
use mlca_tables::{GwpVersion, TableSet};

/// Gas identifier mapped to a mass in kilograms.
pub type GasAmount = BTreeMap<String, f64>;

fn unknown_gas(gas: &str, version: GwpVersion) -> LcaError {
    LcaError::UnknownGas(
        ErrorInfo::new("unknown_gas", "gas is not in the selected GWP table")
            .with_context("gas", gas)
            .with_context("version", version.label()),
    )
}

/// GWP-100 multiplier of a single gas.
pub fn gwp_factor(tables: &TableSet, gas: &str, version: GwpVersion) -> Result<f64, LcaError> {
    tables
        .gwp_table(version)?
        .get(gas)
        .copied()
        .ok_or_else(|| unknown_gas(gas, version))
}

/// CO2-equivalent contribution of every gas, keyed by gas.
pub fn gas_breakdown(
    tables: &TableSet,
    gases: &GasAmount,
    version: GwpVersion,
) -> Result<BTreeMap<String, f64>, LcaError> {
    let table = tables.gwp_table(version)?;
    gases
        .iter()
        .map(|(gas, amount)| {
            let factor = table.get(gas).ok_or_else(|| unknown_gas(gas, version))?;
            Ok((gas.clone(), amount * factor))
        })
        .collect()
}

/// Converts a gas inventory to kg CO2e. Unknown gases fail the whole conversion.
pub fn co2e(tables: &TableSet, gases: &GasAmount, version: GwpVersion) -> Result<f64, LcaError> {
    Ok(gas_breakdown(tables, gases, version)?.values().sum())
}

/// Gases available in a GWP table.
pub fn available_gases(tables: &TableSet, version: GwpVersion) -> Result<Vec<String>, LcaError> {
    Ok(tables.gwp_table(version)?.keys().cloned().collect())
}
