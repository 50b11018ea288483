use std::path::PathBuf;

use mlca_batch::{load_plan, Plan};
use mlca_core::serde::from_yaml_slice;

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
}

#[test]
fn plan_roundtrip_is_stable() {
    let path = fixture_path("plans/smoke.yaml");
    let plan = load_plan(&path).expect("plan loads");
    let names: Vec<&str> = plan.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        ["aluminum_recycled", "aluminum_virgin", "copper_wire", "invalid_fraction"]
    );

    let serialized = plan.to_yaml_string().expect("serialize");
    let mut reparsed: Plan = from_yaml_slice(serialized.as_bytes()).expect("reparse");
    reparsed.normalise().expect("normalise");
    let normalized = reparsed.to_yaml_string().expect("normalized serialize");
    let serialized_value: serde_yaml::Value = serde_yaml::from_str(&serialized).expect("value");
    let normalized_value: serde_yaml::Value = serde_yaml::from_str(&normalized).expect("value");
    assert_eq!(serialized_value, normalized_value);
    assert_eq!(plan.plan_hash().expect("hash"), reparsed.plan_hash().expect("hash"));
}
