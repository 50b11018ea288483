use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use mlca_tables::{builtin_tables, load_tables, GwpVersion, SharedTables, BUILTIN_TABLES_YAML};

fn shipped_tables_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("lca_tables.yaml")
}

#[test]
fn shipped_file_matches_builtin_snapshot() {
    let from_disk = load_tables(shipped_tables_path()).expect("load shipped tables");
    let builtin = builtin_tables().expect("builtin");
    assert_eq!(&from_disk, builtin.as_ref());
    assert_eq!(
        from_disk.content_hash().expect("hash disk"),
        builtin.content_hash().expect("hash builtin")
    );
}

#[test]
fn both_gwp_versions_cover_the_same_gases() {
    let tables = builtin_tables().expect("builtin");
    let ar5: Vec<_> = tables.gwp[&GwpVersion::Ar5].keys().collect();
    let ar6: Vec<_> = tables.gwp[&GwpVersion::Ar6].keys().collect();
    assert_eq!(ar5, ar6);
}

#[test]
fn metal_aliases_resolve() {
    let tables = builtin_tables().expect("builtin");
    assert_eq!(tables.canonical_metal("Aluminium").expect("alias"), "aluminum");
    assert_eq!(tables.canonical_metal(" CU ").expect("alias"), "copper");
    let err = tables.canonical_metal("zinc").expect_err("zinc is not modelled");
    assert_eq!(err.code(), "unknown_metal");
}

#[test]
fn unknown_lookups_use_their_own_families() {
    let tables = builtin_tables().expect("builtin");
    let preset = tables.grid_preset("lunar").expect_err("no such preset");
    assert!(matches!(preset, mlca_core::LcaError::UnknownPreset(_)));
    let mode = tables.transport_mode("air_freight").expect_err("no such mode");
    assert!(matches!(mode, mlca_core::LcaError::UnknownTransportMode(_)));
}

#[test]
fn published_snapshot_leaves_earlier_readers_untouched() {
    let shared = SharedTables::from_builtin().expect("shared");
    let before = shared.snapshot();

    let temp = tempfile::tempdir().expect("tmp dir");
    let path = temp.path().join("tables.yaml");
    let updated = BUILTIN_TABLES_YAML
        .replace("version: \"2024.1\"", "version: \"2025.1\"")
        .replace("coal: 0.82", "coal: 0.80");
    fs::write(&path, updated).expect("write tables");

    let after = shared.reload_from(&path).expect("reload");
    assert_eq!(after.version, "2025.1");
    assert_eq!(after.grid.source_factors["coal"], 0.80);
    assert_eq!(before.version, "2024.1");
    assert_eq!(before.grid.source_factors["coal"], 0.82);
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(Arc::ptr_eq(&after, &shared.snapshot()));
}

#[test]
fn invalid_reload_keeps_current_snapshot() {
    let shared = SharedTables::from_builtin().expect("shared");
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = temp.path().join("broken.yaml");
    let broken = BUILTIN_TABLES_YAML.replace("CO2: 1\n    CH4: 28", "CO2: 2\n    CH4: 28");
    fs::write(&path, broken).expect("write tables");

    let err = shared.reload_from(&path).expect_err("CO2 must be 1");
    assert_eq!(err.code(), "table_validate");
    assert!(err.info().context.contains_key("path"));
    assert_eq!(shared.snapshot().version, "2024.1");
}

#[test]
fn content_hash_is_memoised_and_clones_rehash() {
    let tables = builtin_tables().expect("builtin");
    let first = tables.content_hash().expect("hash");
    assert_eq!(first, tables.content_hash().expect("hash again"));
    assert_eq!(first, mlca_core::hash::stable_hash_string(tables.as_ref()).expect("direct"));

    let mut edited = tables.as_ref().clone();
    assert_eq!(edited, *tables);
    edited.version = "2024.1-edited".to_string();
    assert_ne!(edited.content_hash().expect("edited hash"), first);
}
