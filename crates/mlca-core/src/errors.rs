//! Structured error types shared across the metal LCA crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`LcaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, offending values, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the metal LCA engine.
///
/// Lookup misses against the constant tables each have their own family so
/// callers can branch on them without parsing codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum LcaError {
    /// Out-of-range mass, fraction, percentage or otherwise malformed scenario.
    #[error("invalid scenario: {0}")]
    InvalidScenario(ErrorInfo),
    /// Gas identifier absent from the selected GWP table.
    #[error("unknown gas: {0}")]
    UnknownGas(ErrorInfo),
    /// Electricity source absent from the grid factor table.
    #[error("unknown electricity source: {0}")]
    UnknownSource(ErrorInfo),
    /// Process absent from the metal's process table.
    #[error("unknown process: {0}")]
    UnknownProcess(ErrorInfo),
    /// Transport mode absent from the transport factor table.
    #[error("unknown transport mode: {0}")]
    UnknownTransportMode(ErrorInfo),
    /// Named preset (grid mix, collection region, freight corridor) not found.
    #[error("unknown preset: {0}")]
    UnknownPreset(ErrorInfo),
    /// Constant table set failed to load or validate.
    #[error("table error: {0}")]
    Table(ErrorInfo),
    /// Serialization, schema and I/O errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl LcaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            LcaError::InvalidScenario(info)
            | LcaError::UnknownGas(info)
            | LcaError::UnknownSource(info)
            | LcaError::UnknownProcess(info)
            | LcaError::UnknownTransportMode(info)
            | LcaError::UnknownPreset(info)
            | LcaError::Table(info)
            | LcaError::Serde(info) => info,
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Returns true for misses against the constant tables.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            LcaError::UnknownGas(_)
                | LcaError::UnknownSource(_)
                | LcaError::UnknownProcess(_)
                | LcaError::UnknownTransportMode(_)
                | LcaError::UnknownPreset(_)
        )
    }
}

/// Builds an [`LcaError::InvalidScenario`] for a value outside its permitted range.
pub fn out_of_range(field: &str, value: f64, range: &str) -> LcaError {
    LcaError::InvalidScenario(
        ErrorInfo::new(
            "value_out_of_range",
            format!("{field} must lie in {range}"),
        )
        .with_context("field", field)
        .with_context("value", value.to_string())
        .with_context("range", range),
    )
}

/// Builds an [`LcaError::Serde`] from an arbitrary I/O or parse failure.
pub fn io_error(code: &str, err: impl ToString) -> LcaError {
    LcaError::Serde(ErrorInfo::new(code, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_and_hint() {
        let info = ErrorInfo::new("unknown_gas", "gas not in table")
            .with_context("gas", "SO2")
            .with_hint("use one of the AR5 gases");
        let rendered = LcaError::UnknownGas(info).to_string();
        assert!(rendered.starts_with("unknown gas: gas not in table (code: unknown_gas)"));
        assert!(rendered.contains("gas=SO2"));
        assert!(rendered.contains("hint: use one of the AR5 gases"));
    }

    #[test]
    fn out_of_range_is_invalid_scenario() {
        let err = out_of_range("recycled_fraction", 1.3, "[0, 1]");
        assert!(matches!(err, LcaError::InvalidScenario(_)));
        assert_eq!(err.code(), "value_out_of_range");
        assert_eq!(err.info().context["value"], "1.3");
        assert!(!err.is_lookup_miss());
    }
}
