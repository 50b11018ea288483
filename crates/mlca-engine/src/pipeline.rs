//! Ingest → aggregate → downstream stage composition.

use std::path::Path;
use std::sync::Arc;

use mlca_core::errors::LcaError;
use mlca_core::serde::{from_json_slice, from_yaml_slice, to_canonical_json_pretty};
use mlca_tables::TableSet;

use crate::aggregate::{aggregate, LcaResult};
use crate::config::AggregationConfig;
use crate::scenario::Scenario;

/// Turns raw bytes into a scenario.
pub trait ScenarioIngest: Send + Sync {
    /// Parses one scenario document.
    fn ingest(&self, raw: &[u8]) -> Result<Scenario, LcaError>;
}

impl<T: ScenarioIngest + ?Sized> ScenarioIngest for Box<T> {
    fn ingest(&self, raw: &[u8]) -> Result<Scenario, LcaError> {
        (**self).ingest(raw)
    }
}

/// JSON scenario documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonIngest;

impl ScenarioIngest for JsonIngest {
    fn ingest(&self, raw: &[u8]) -> Result<Scenario, LcaError> {
        from_json_slice(raw)
    }
}

/// YAML scenario documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlIngest;

impl ScenarioIngest for YamlIngest {
    fn ingest(&self, raw: &[u8]) -> Result<Scenario, LcaError> {
        from_yaml_slice(raw)
    }
}

/// Picks the ingest for a file by extension; anything but `.json` is read as YAML.
pub fn ingest_for_path(path: &Path) -> Box<dyn ScenarioIngest> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Box::new(JsonIngest),
        _ => Box::new(YamlIngest),
    }
}

/// Consumer of a finished result.
pub trait ResultStage {
    /// Stage output.
    type Output;

    /// Derives the output from an immutable result.
    fn apply(&self, result: &LcaResult) -> Result<Self::Output, LcaError>;
}

/// Renders a result as canonical pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalJsonStage;

impl ResultStage for CanonicalJsonStage {
    type Output = String;

    fn apply(&self, result: &LcaResult) -> Result<String, LcaError> {
        to_canonical_json_pretty(result)
    }
}

/// Ingest, table snapshot and config bound together.
pub struct Pipeline<I> {
    ingest: I,
    tables: Arc<TableSet>,
    config: AggregationConfig,
}

impl<I: ScenarioIngest> Pipeline<I> {
    /// Binds an ingest to a table snapshot and config.
    pub fn new(ingest: I, tables: Arc<TableSet>, config: AggregationConfig) -> Self {
        Self {
            ingest,
            tables,
            config,
        }
    }

    /// Table snapshot used by every run.
    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    /// Parses and assesses one document.
    pub fn run(&self, raw: &[u8]) -> Result<LcaResult, LcaError> {
        let scenario = self.ingest.ingest(raw)?;
        aggregate(&self.tables, &scenario, &self.config)
    }

    /// Parses, assesses and hands the result to `stage`.
    pub fn run_with<S: ResultStage>(&self, raw: &[u8], stage: &S) -> Result<S::Output, LcaError> {
        let result = self.run(raw)?;
        stage.apply(&result)
    }
}
