#![deny(missing_docs)]
#![doc = "Shared error taxonomy, data-quality warnings, canonical serialisation and provenance for the metal LCA workspace."]

/// Structured error types.
pub mod errors;
/// SHA-256 digests of scenarios, results and table snapshots.
pub mod hash;
/// Rounding and ratio helpers shared by every calculator.
pub mod numeric;
/// Provenance descriptors attached to reports.
pub mod provenance;
/// Canonical JSON for reports and hashes; YAML for scenario, plan and table files.
pub mod serde;
/// Non-fatal data-quality warnings.
pub mod warnings;

pub use errors::{ErrorInfo, LcaError};
pub use hash::stable_hash_string;
pub use numeric::{percent_of, ratio_or_zero, round_to};
pub use provenance::{RunProvenance, SchemaVersion};
pub use warnings::{DataQualityWarning, WarningSink};
