//! First-order uncertainty propagation over the stage totals.

use mlca_core::errors::{out_of_range, LcaError};
use mlca_core::numeric::{ratio_or_zero, round_to};
use mlca_tables::UncertaintyTables;
use serde::{Deserialize, Serialize};

/// Method tag written into results.
pub const UNCERTAINTY_METHOD: &str = "quadrature-normal";

const NOTE: &str = "independent stage errors combined in quadrature; interval assumes a normal distribution around the net total";

/// Stage totals the coefficients of variation apply to, kg CO2e.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageTotals {
    /// Primary-route emissions.
    pub primary_kg_co2e: f64,
    /// Secondary-route emissions.
    pub secondary_kg_co2e: f64,
    /// Transport emissions.
    pub transport_kg_co2e: f64,
}

/// Normal interval around the net total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyAnalysis {
    /// Net total, kg CO2e.
    pub mean_kg_co2e: f64,
    /// Combined standard deviation, kg CO2e.
    pub std_dev_kg_co2e: f64,
    /// Primary-route contribution to the deviation, kg CO2e.
    pub primary_std_dev_kg_co2e: f64,
    /// Secondary-route contribution to the deviation, kg CO2e.
    pub secondary_std_dev_kg_co2e: f64,
    /// Transport contribution to the deviation, kg CO2e.
    pub transport_std_dev_kg_co2e: f64,
    /// Two-sided confidence level.
    pub confidence_level: f64,
    /// Standard-normal quantile for the level.
    pub z_score: f64,
    /// `mean − z·σ`; not clamped at zero.
    pub lower_bound_kg_co2e: f64,
    /// `mean + z·σ`.
    pub upper_bound_kg_co2e: f64,
    /// `σ / |mean|`, percent; 0 when the mean is 0.
    pub coefficient_of_variation_pct: f64,
    /// Method tag.
    pub method: String,
    /// Assumptions behind the interval.
    pub note: String,
}

impl UncertaintyAnalysis {
    pub(crate) fn rounded(mut self, digits: u32) -> Self {
        self.mean_kg_co2e = round_to(self.mean_kg_co2e, digits);
        self.std_dev_kg_co2e = round_to(self.std_dev_kg_co2e, digits);
        self.primary_std_dev_kg_co2e = round_to(self.primary_std_dev_kg_co2e, digits);
        self.secondary_std_dev_kg_co2e = round_to(self.secondary_std_dev_kg_co2e, digits);
        self.transport_std_dev_kg_co2e = round_to(self.transport_std_dev_kg_co2e, digits);
        self.lower_bound_kg_co2e = round_to(self.lower_bound_kg_co2e, digits);
        self.upper_bound_kg_co2e = round_to(self.upper_bound_kg_co2e, digits);
        self.coefficient_of_variation_pct = round_to(self.coefficient_of_variation_pct, digits);
        self
    }
}

// Acklam's rational approximation, relative error below 1.2e-9.
const A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_69e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const P_LOW: f64 = 0.02425;

fn tail(q: f64) -> f64 {
    let num = ((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5];
    let den = (((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0;
    num / den
}

/// Standard-normal quantile for `p` in (0, 1).
pub fn inverse_normal_cdf(p: f64) -> Result<f64, LcaError> {
    if !p.is_finite() || p <= 0.0 || p >= 1.0 {
        return Err(out_of_range("probability", p, "(0, 1)"));
    }
    let x = if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        let num = (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q;
        let den = ((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0;
        num / den
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    };
    Ok(x)
}

/// Two-sided z for a confidence level in (0, 1).
pub fn z_for_confidence(level: f64) -> Result<f64, LcaError> {
    if !level.is_finite() || level <= 0.0 || level >= 1.0 {
        return Err(out_of_range("confidence_level", level, "(0, 1)"));
    }
    inverse_normal_cdf(0.5 + level / 2.0)
}

/// Combines stage CVs in quadrature around `mean`.
pub fn propagate(
    cvs: &UncertaintyTables,
    mean_kg_co2e: f64,
    stages: StageTotals,
    confidence_level: f64,
) -> Result<UncertaintyAnalysis, LcaError> {
    let z = z_for_confidence(confidence_level)?;
    let primary = (stages.primary_kg_co2e * cvs.primary_cv).abs();
    let secondary = (stages.secondary_kg_co2e * cvs.secondary_cv).abs();
    let transport = (stages.transport_kg_co2e * cvs.transport_cv).abs();
    let std_dev = (primary * primary + secondary * secondary + transport * transport).sqrt();

    Ok(UncertaintyAnalysis {
        mean_kg_co2e,
        std_dev_kg_co2e: std_dev,
        primary_std_dev_kg_co2e: primary,
        secondary_std_dev_kg_co2e: secondary,
        transport_std_dev_kg_co2e: transport,
        confidence_level,
        z_score: z,
        lower_bound_kg_co2e: mean_kg_co2e - z * std_dev,
        upper_bound_kg_co2e: mean_kg_co2e + z * std_dev,
        coefficient_of_variation_pct: ratio_or_zero(std_dev, mean_kg_co2e.abs()) * 100.0,
        method: UNCERTAINTY_METHOD.to_string(),
        note: NOTE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cvs() -> UncertaintyTables {
        UncertaintyTables {
            primary_cv: 0.15,
            secondary_cv: 0.20,
            transport_cv: 0.10,
        }
    }

    #[test]
    fn known_quantiles() {
        assert!((z_for_confidence(0.95).expect("z") - 1.959_964).abs() < 1e-6);
        assert!((z_for_confidence(0.90).expect("z") - 1.644_854).abs() < 1e-6);
        assert!((z_for_confidence(0.99).expect("z") - 2.575_829).abs() < 1e-6);
        assert!(inverse_normal_cdf(0.5).expect("median").abs() < 1e-12);
        let low = inverse_normal_cdf(0.001).expect("tail");
        let high = inverse_normal_cdf(0.999).expect("tail");
        assert!((low + high).abs() < 1e-9);
    }

    #[test]
    fn quadrature_combination() {
        let stages = StageTotals {
            primary_kg_co2e: 100.0,
            secondary_kg_co2e: 50.0,
            transport_kg_co2e: 10.0,
        };
        let analysis = propagate(&cvs(), 120.0, stages, 0.95).expect("propagate");
        let expected = (15.0f64 * 15.0 + 10.0 * 10.0 + 1.0).sqrt();
        assert!((analysis.std_dev_kg_co2e - expected).abs() < 1e-12);
        assert_eq!(analysis.primary_std_dev_kg_co2e, 15.0);
        assert_eq!(analysis.secondary_std_dev_kg_co2e, 10.0);
        assert!((analysis.transport_std_dev_kg_co2e - 1.0).abs() < 1e-12);
        assert!(analysis.lower_bound_kg_co2e < 120.0 && analysis.upper_bound_kg_co2e > 120.0);
        assert_eq!(analysis.method, UNCERTAINTY_METHOD);
    }

    #[test]
    fn stage_deviations_recombine_to_total() {
        let stages = StageTotals {
            primary_kg_co2e: 8_412.7,
            secondary_kg_co2e: 371.25,
            transport_kg_co2e: 12.4,
        };
        let analysis = propagate(&cvs(), 7_900.0, stages, 0.90).expect("propagate");
        let recombined = (analysis.primary_std_dev_kg_co2e.powi(2)
            + analysis.secondary_std_dev_kg_co2e.powi(2)
            + analysis.transport_std_dev_kg_co2e.powi(2))
        .sqrt();
        assert!((recombined - analysis.std_dev_kg_co2e).abs() < 1e-9);
        assert!(analysis.primary_std_dev_kg_co2e > analysis.secondary_std_dev_kg_co2e);
    }

    #[test]
    fn zero_mean_has_zero_cv() {
        let stages = StageTotals {
            primary_kg_co2e: 0.0,
            secondary_kg_co2e: 0.0,
            transport_kg_co2e: 0.0,
        };
        let analysis = propagate(&cvs(), 0.0, stages, 0.95).expect("propagate");
        assert_eq!(analysis.std_dev_kg_co2e, 0.0);
        assert_eq!(analysis.coefficient_of_variation_pct, 0.0);
    }
}
