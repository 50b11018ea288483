//! Per-call aggregation settings.

use mlca_core::errors::{out_of_range, LcaError};
use mlca_tables::GwpVersion;
use serde::{Deserialize, Serialize};

/// Method used for the non-climate impact categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImpactMethod {
    /// Fixed per-metal multipliers on CO2e or mass.
    #[default]
    LinearProxy,
}

impl ImpactMethod {
    /// Tag written into results.
    pub fn tag(&self) -> &'static str {
        match self {
            ImpactMethod::LinearProxy => "linear-proxy",
        }
    }
}

/// Settings for one aggregation call. There is no process-wide default;
/// the GWP version is always chosen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// GWP table used for every gas conversion.
    pub gwp_version: GwpVersion,
    /// Decimal places for summary sections; full precision when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Two-sided confidence level of the uncertainty interval.
    #[serde(default = "AggregationConfig::default_confidence_level")]
    pub confidence_level: f64,
    /// Subtract the avoided-virgin credit outside gate-to-gate studies.
    #[serde(default = "AggregationConfig::default_include_eol_credit")]
    pub include_eol_credit: bool,
    /// Impact-category method.
    #[serde(default)]
    pub impact_method: ImpactMethod,
    /// Label recorded as the calculation time.
    #[serde(default = "AggregationConfig::default_calculated_at")]
    pub calculated_at: String,
}

impl AggregationConfig {
    const fn default_confidence_level() -> f64 {
        0.95
    }

    const fn default_include_eol_credit() -> bool {
        true
    }

    fn default_calculated_at() -> String {
        "unspecified".to_string()
    }

    /// Config with defaults for everything except the GWP version.
    pub fn pinned(gwp_version: GwpVersion) -> Self {
        Self {
            gwp_version,
            precision: None,
            confidence_level: Self::default_confidence_level(),
            include_eol_credit: Self::default_include_eol_credit(),
            impact_method: ImpactMethod::default(),
            calculated_at: Self::default_calculated_at(),
        }
    }

    /// Sets summary rounding.
    pub fn with_precision(mut self, digits: u32) -> Self {
        self.precision = Some(digits);
        self
    }

    /// Sets the calculation-time label.
    pub fn with_calculated_at(mut self, label: impl Into<String>) -> Self {
        self.calculated_at = label.into();
        self
    }

    /// Enables or disables the end-of-life credit.
    pub fn with_eol_credit(mut self, include: bool) -> Self {
        self.include_eol_credit = include;
        self
    }

    /// Checks the confidence level and precision.
    pub fn validate(&self) -> Result<(), LcaError> {
        let level = self.confidence_level;
        if !level.is_finite() || level <= 0.0 || level >= 1.0 {
            return Err(out_of_range("confidence_level", level, "(0, 1)"));
        }
        if let Some(digits) = self.precision {
            if digits > 12 {
                return Err(out_of_range("precision", f64::from(digits), "[0, 12]"));
            }
        }
        Ok(())
    }
}
