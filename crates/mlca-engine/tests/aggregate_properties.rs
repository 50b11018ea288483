use mlca_core::LcaError;
use mlca_engine::{aggregate, AggregationConfig, Scenario};
use mlca_tables::{builtin_tables, GwpVersion};
use proptest::prelude::*;

fn config() -> AggregationConfig {
    AggregationConfig::pinned(GwpVersion::Ar6)
}

#[test]
fn aggregate_twice_is_identical() {
    let tables = builtin_tables().expect("tables");
    let scenario = Scenario::new("aluminum", 1000.0, 0.3).with_product_type("automotive_parts");
    let first = aggregate(&tables, &scenario, &config()).expect("first");
    let second = aggregate(&tables, &scenario, &config()).expect("second");
    assert_eq!(first, second);
    let first_json = mlca_core::serde::to_canonical_json_bytes(&first).expect("json");
    let second_json = mlca_core::serde::to_canonical_json_bytes(&second).expect("json");
    assert_eq!(first_json, second_json);
}

#[test]
fn zero_mass_gives_zero_totals() {
    let tables = builtin_tables().expect("tables");
    let result = aggregate(&tables, &Scenario::new("copper", 0.0, 0.5), &config()).expect("zero mass");
    assert_eq!(result.total_net_emissions_kg_co2e, 0.0);
    assert_eq!(result.emission_intensity_kg_co2e_per_kg, 0.0);
    assert_eq!(result.energy_analysis.energy_intensity_kwh_per_kg, 0.0);
    assert!(result.hotspots.is_empty());
}

#[test]
fn recycled_fraction_above_one_is_invalid() {
    let tables = builtin_tables().expect("tables");
    let err = aggregate(&tables, &Scenario::new("aluminum", 1000.0, 1.3), &config())
        .expect_err("r = 1.3");
    assert!(matches!(err, LcaError::InvalidScenario(_)));
}

#[test]
fn blended_aluminum_lies_between_route_intensities() {
    let tables = builtin_tables().expect("tables");
    let scenario = Scenario::new("aluminum", 1000.0, 0.3).with_grid_preset("national_average");
    let result = aggregate(&tables, &scenario, &config()).expect("blend");
    let secondary_only = aggregate(
        &tables,
        &Scenario::new("aluminum", 1000.0, 1.0).with_grid_preset("national_average"),
        &config(),
    )
    .expect("secondary only");
    let primary_only = aggregate(
        &tables,
        &Scenario::new("aluminum", 1000.0, 0.0).with_grid_preset("national_average"),
        &config(),
    )
    .expect("primary only");

    let total = result.total_net_emissions_kg_co2e;
    assert!(total > secondary_only.total_net_emissions_kg_co2e);
    assert!(total < primary_only.total_net_emissions_kg_co2e);
    let intensity = result.emission_intensity_kg_co2e_per_kg;
    assert!(intensity > result.route_comparison.secondary_intensity_kg_co2e_per_kg);
    assert!(intensity < result.route_comparison.primary_intensity_kg_co2e_per_kg);
}

#[test]
fn gwp_version_changes_direct_gas_contribution() {
    let tables = builtin_tables().expect("tables");
    let scenario = Scenario::new("aluminum", 1000.0, 0.0);
    let ar5 = aggregate(&tables, &scenario, &AggregationConfig::pinned(GwpVersion::Ar5)).expect("ar5");
    let ar6 = aggregate(&tables, &scenario, &AggregationConfig::pinned(GwpVersion::Ar6)).expect("ar6");
    assert_ne!(
        ar5.emission_source_breakdown.process_gas_kg_co2e,
        ar6.emission_source_breakdown.process_gas_kg_co2e
    );
    assert_eq!(
        ar5.emission_source_breakdown.electricity_kg_co2e,
        ar6.emission_source_breakdown.electricity_kg_co2e
    );
    assert_eq!(ar5.lca_metadata.gwp_version, GwpVersion::Ar5);
}

#[test]
fn metadata_records_tables_and_config() {
    let tables = builtin_tables().expect("tables");
    let config = config().with_calculated_at("2024-06-01T00:00:00Z");
    let result = aggregate(&tables, &Scenario::new("cu", 10.0, 0.1), &config).expect("aggregate");
    assert_eq!(result.lca_metadata.metal_type, "copper");
    assert_eq!(result.lca_metadata.table_version, tables.version);
    assert_eq!(result.lca_metadata.table_hash, tables.content_hash().expect("hash"));
    assert_eq!(result.lca_metadata.calculated_at, "2024-06-01T00:00:00Z");
    assert_eq!(result.impact_categories.method, "linear-proxy");
    assert!(!result.warnings.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn uncertainty_interval_brackets_net_total(mass in 0.0f64..1e6, r in 0.0f64..=1.0) {
        let tables = builtin_tables().expect("tables");
        let result = aggregate(&tables, &Scenario::new("copper", mass, r), &config()).expect("aggregate");
        let u = &result.uncertainty_analysis;
        prop_assert_eq!(u.mean_kg_co2e, result.total_net_emissions_kg_co2e);
        prop_assert!(u.lower_bound_kg_co2e <= u.mean_kg_co2e);
        prop_assert!(u.upper_bound_kg_co2e >= u.mean_kg_co2e);
        prop_assert!((0.0..=1.0).contains(&result.kpis.circularity_index));
        prop_assert!(result.kpis.resource_efficiency_score <= 100.0);
    }
}
