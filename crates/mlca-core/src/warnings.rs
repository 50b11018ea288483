//! Non-fatal data-quality warnings collected alongside successful results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A non-fatal data-quality finding.
///
/// Warnings never abort a calculation; they are logged through `tracing` and
/// returned with the result that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityWarning {
    /// Stable machine readable warning code.
    pub code: String,
    /// Human readable description.
    pub message: String,
    /// Contextual key value pairs.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl DataQualityWarning {
    /// Creates a new warning with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Adds a context entry to the warning.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Ordered collector of warnings raised while evaluating one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningSink {
    warnings: Vec<DataQualityWarning>,
}

impl WarningSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and emits it as a `tracing` event.
    pub fn push(&mut self, warning: DataQualityWarning) {
        tracing::warn!(code = %warning.code, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Records every warning from another collection.
    pub fn extend(&mut self, warnings: impl IntoIterator<Item = DataQualityWarning>) {
        for warning in warnings {
            self.push(warning);
        }
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consumes the sink, returning the warnings in the order they were raised.
    pub fn into_vec(self) -> Vec<DataQualityWarning> {
        self.warnings
    }
}
