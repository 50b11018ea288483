use mlca_core::errors::{ErrorInfo, LcaError};
use mlca_core::serde::{from_json_slice, to_canonical_json_bytes};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("id", "1")
        .with_context("reason", "example")
}

#[test]
fn invalid_scenario_surface() {
    let err = LcaError::InvalidScenario(sample_info("value_out_of_range", "fraction"));
    assert_eq!(err.info().code, "value_out_of_range");
    assert!(err.info().context.contains_key("id"));
    assert!(!err.is_lookup_miss());
}

#[test]
fn lookup_miss_surfaces() {
    let misses = [
        LcaError::UnknownGas(sample_info("unknown_gas", "gas")),
        LcaError::UnknownSource(sample_info("unknown_source", "source")),
        LcaError::UnknownProcess(sample_info("unknown_process", "process")),
        LcaError::UnknownTransportMode(sample_info("unknown_transport_mode", "mode")),
        LcaError::UnknownPreset(sample_info("unknown_grid_preset", "preset")),
    ];
    for err in misses {
        assert!(err.is_lookup_miss(), "{err}");
        assert!(err.info().context.contains_key("reason"));
    }
}

#[test]
fn table_and_serde_surfaces() {
    let table = LcaError::Table(sample_info("table_validate", "bad"));
    assert_eq!(table.code(), "table_validate");
    let serde = LcaError::Serde(sample_info("json_write", "bad"));
    assert_eq!(serde.code(), "json_write");
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = LcaError::UnknownGas(ErrorInfo::new("unknown_gas", "SO2 is not in AR5"));
    let bytes = to_canonical_json_bytes(&err).expect("serialize");
    let text = String::from_utf8(bytes.clone()).expect("utf8");
    assert!(text.contains(r#""family":"UnknownGas""#));
    let back: LcaError = from_json_slice(&bytes).expect("deserialize");
    assert_eq!(back, err);
}
