//! Risk reduction factor arithmetic
//!
//! Global invariants enforced:
//! - Every RRF is the reciprocal of a validated PFD
//! - RRFs compose multiplicatively; an empty layer set is the identity (1.0)
//! - Divisions by a non-positive denominator fail instead of producing inf/NaN

use crate::error::{LopaError, Result};
use crate::sil::{sil_for_additional_rrf, SilLevel};
use crate::validation::{is_valid_pfd, MAX_CREDITABLE_PFD, MIN_CREDITABLE_PFD};
use serde::{Deserialize, Serialize};

/// Gap ratio below which the gap is inadequate
pub const MARGINAL_GAP_THRESHOLD: f64 = 0.5;
/// Gap ratio at or above which protection is adequate
pub const ADEQUATE_GAP_THRESHOLD: f64 = 1.0;

/// Classification of a gap ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapStatus {
    Adequate,
    Marginal,
    Inadequate,
}

impl GapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapStatus::Adequate => "adequate",
            GapStatus::Marginal => "marginal",
            GapStatus::Inadequate => "inadequate",
        }
    }
}

/// Configurable gap status thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapThresholds {
    pub marginal: f64,
    pub adequate: f64,
}

impl Default for GapThresholds {
    fn default() -> Self {
        GapThresholds {
            marginal: MARGINAL_GAP_THRESHOLD,
            adequate: ADEQUATE_GAP_THRESHOLD,
        }
    }
}

impl GapThresholds {
    /// Inclusive lower bounds, highest first; below every bound is inadequate
    pub fn bands(&self) -> [(f64, GapStatus); 2] {
        [
            (self.adequate, GapStatus::Adequate),
            (self.marginal, GapStatus::Marginal),
        ]
    }
}

/// RRF of a single layer: `1 / pfd`
pub fn calculate_rrf(pfd: f64) -> Result<f64> {
    if !is_valid_pfd(pfd) {
        return Err(LopaError::InvalidPfd(pfd));
    }
    Ok(1.0 / pfd)
}

/// Combined RRF of independent layers: `1 / Π pfd`
///
/// Every PFD is checked before any multiplication; the first invalid one fails.
pub fn calculate_total_rrf(pfds: &[f64]) -> Result<f64> {
    if pfds.is_empty() {
        return Ok(1.0);
    }
    if let Some(&bad) = pfds.iter().find(|&&p| !is_valid_pfd(p)) {
        return Err(LopaError::InvalidPfd(bad));
    }
    let product: f64 = pfds.iter().product();
    Ok(1.0 / product)
}

/// Mitigated event likelihood: `ief / total_rrf`
pub fn calculate_mitigated_event_likelihood(ief: f64, total_rrf: f64) -> Result<f64> {
    if total_rrf.is_nan() || total_rrf <= 0.0 {
        return Err(LopaError::NonPositiveTotalRrf(total_rrf));
    }
    Ok(ief / total_rrf)
}

/// Required RRF: `ief / tmel`
pub fn calculate_required_rrf(ief: f64, tmel: f64) -> Result<f64> {
    if tmel.is_nan() || tmel <= 0.0 {
        return Err(LopaError::NonPositiveTargetFrequency(tmel));
    }
    Ok(ief / tmel)
}

/// Gap ratio: `total_rrf / required_rrf` (1.0 or more means the target is met)
pub fn calculate_gap_ratio(total_rrf: f64, required_rrf: f64) -> Result<f64> {
    if required_rrf.is_nan() || required_rrf <= 0.0 {
        return Err(LopaError::NonPositiveRequiredRrf(required_rrf));
    }
    Ok(total_rrf / required_rrf)
}

/// `log10(rrf)`, or 0 for a non-positive RRF
pub fn calculate_orders_of_magnitude(rrf: f64) -> f64 {
    if rrf <= 0.0 {
        return 0.0;
    }
    rrf.log10()
}

/// Assign gap status with default thresholds
pub fn determine_gap_status(gap_ratio: f64) -> GapStatus {
    determine_gap_status_with_thresholds(gap_ratio, &GapThresholds::default())
}

/// Assign gap status with custom thresholds
pub fn determine_gap_status_with_thresholds(
    gap_ratio: f64,
    thresholds: &GapThresholds,
) -> GapStatus {
    thresholds
        .bands()
        .iter()
        .find(|(lower, _)| gap_ratio >= *lower)
        .map(|(_, status)| *status)
        .unwrap_or(GapStatus::Inadequate)
}

/// SIL of one additional safety function that would close the gap
///
/// `None` when the gap ratio already meets the adequate threshold.
pub fn determine_required_sil(gap_ratio: f64) -> Option<SilLevel> {
    determine_required_sil_with_thresholds(gap_ratio, &GapThresholds::default())
}

pub fn determine_required_sil_with_thresholds(
    gap_ratio: f64,
    thresholds: &GapThresholds,
) -> Option<SilLevel> {
    additional_rrf_needed_with_thresholds(gap_ratio, thresholds).map(sil_for_additional_rrf)
}

/// RRF an added layer must supply to lift `gap_ratio` to the adequate threshold
///
/// `None` when already adequate; otherwise always above 1.
pub fn additional_rrf_needed_with_thresholds(
    gap_ratio: f64,
    thresholds: &GapThresholds,
) -> Option<f64> {
    if gap_ratio >= thresholds.adequate {
        return None;
    }
    Some(thresholds.adequate / gap_ratio)
}

/// Force a PFD into the creditable band
///
/// Not used by validation, which rejects instead. NaN maps to no credit.
pub fn clamp_pfd(pfd: f64) -> f64 {
    if pfd.is_nan() {
        return MAX_CREDITABLE_PFD;
    }
    pfd.clamp(MIN_CREDITABLE_PFD, MAX_CREDITABLE_PFD)
}
