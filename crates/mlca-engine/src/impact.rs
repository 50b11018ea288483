//! Impact-category proxies derived from the climate result.

use mlca_core::numeric::round_to;
use mlca_tables::ImpactFactors;
use serde::{Deserialize, Serialize};

use crate::config::ImpactMethod;

const NOTE: &str = "acidification, eutrophication and ozone scale with net CO2e; water and land use scale with metal mass";

/// Midpoint categories. Only climate change is a full characterisation;
/// the rest are proxies tagged with their method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactCategories {
    /// Method tag, e.g. `linear-proxy`.
    pub method: String,
    /// Net GWP-100, kg CO2e.
    pub climate_change_kg_co2e: f64,
    /// kg SO2-eq.
    pub acidification_kg_so2_eq: f64,
    /// kg PO4-eq.
    pub eutrophication_kg_po4_eq: f64,
    /// kg CFC-11-eq.
    pub ozone_depletion_kg_cfc11_eq: f64,
    /// m³.
    pub water_consumption_m3: f64,
    /// m²·year.
    pub land_use_m2_year: f64,
    /// Basis of the proxies.
    pub note: String,
}

impl ImpactCategories {
    pub(crate) fn rounded(mut self, digits: u32) -> Self {
        self.climate_change_kg_co2e = round_to(self.climate_change_kg_co2e, digits);
        self.acidification_kg_so2_eq = round_to(self.acidification_kg_so2_eq, digits);
        self.eutrophication_kg_po4_eq = round_to(self.eutrophication_kg_po4_eq, digits);
        self.ozone_depletion_kg_cfc11_eq = round_to(self.ozone_depletion_kg_cfc11_eq, digits);
        self.water_consumption_m3 = round_to(self.water_consumption_m3, digits);
        self.land_use_m2_year = round_to(self.land_use_m2_year, digits);
        self
    }
}

/// Applies the metal's proxy factors. A negative net total yields zero for
/// the CO2e-scaled categories.
pub fn impact_categories(
    factors: &ImpactFactors,
    method: ImpactMethod,
    net_kg_co2e: f64,
    mass_kg: f64,
) -> ImpactCategories {
    let scaled = net_kg_co2e.max(0.0);
    match method {
        ImpactMethod::LinearProxy => ImpactCategories {
            method: method.tag().to_string(),
            climate_change_kg_co2e: net_kg_co2e,
            acidification_kg_so2_eq: scaled * factors.acidification_kg_so2_eq_per_kg_co2e,
            eutrophication_kg_po4_eq: scaled * factors.eutrophication_kg_po4_eq_per_kg_co2e,
            ozone_depletion_kg_cfc11_eq: scaled * factors.ozone_depletion_kg_cfc11_eq_per_kg_co2e,
            water_consumption_m3: mass_kg * factors.water_m3_per_kg_metal,
            land_use_m2_year: mass_kg * factors.land_use_m2_year_per_kg_metal,
            note: NOTE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors() -> ImpactFactors {
        ImpactFactors {
            acidification_kg_so2_eq_per_kg_co2e: 0.01,
            eutrophication_kg_po4_eq_per_kg_co2e: 0.002,
            ozone_depletion_kg_cfc11_eq_per_kg_co2e: 1e-8,
            water_m3_per_kg_metal: 2.0,
            land_use_m2_year_per_kg_metal: 0.5,
        }
    }

    #[test]
    fn proxies_scale_linearly() {
        let impacts = impact_categories(&factors(), ImpactMethod::LinearProxy, 1000.0, 10.0);
        assert_eq!(impacts.method, "linear-proxy");
        assert_eq!(impacts.climate_change_kg_co2e, 1000.0);
        assert!((impacts.acidification_kg_so2_eq - 10.0).abs() < 1e-12);
        assert!((impacts.water_consumption_m3 - 20.0).abs() < 1e-12);
        assert!((impacts.land_use_m2_year - 5.0).abs() < 1e-12);
    }

    #[test]
    fn negative_net_keeps_climate_sign_only() {
        let impacts = impact_categories(&factors(), ImpactMethod::LinearProxy, -50.0, 10.0);
        assert_eq!(impacts.climate_change_kg_co2e, -50.0);
        assert_eq!(impacts.acidification_kg_so2_eq, 0.0);
        assert!((impacts.water_consumption_m3 - 20.0).abs() < 1e-12);
    }
}
