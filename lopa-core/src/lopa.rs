//! LOPA calculation entry point
//!
//! Validation failure is fatal here: either every figure is computed or the
//! call fails with all validation messages. Non-independent IPLs are rejected
//! along with PFD and frequency problems so no entry point credits them.

use crate::error::{LopaError, Result};
use crate::ipl::LopaInput;
use crate::rrf::{
    calculate_gap_ratio, calculate_mitigated_event_likelihood, calculate_required_rrf,
    calculate_rrf, calculate_total_rrf, determine_gap_status_with_thresholds,
    determine_required_sil_with_thresholds, GapStatus, GapThresholds,
};
use crate::sil::SilLevel;
use crate::validation::{independence_errors, prefix_ipl_error, validate_lopa_input};
use serde::{Deserialize, Serialize};

/// RRF credited for one IPL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IplRrf {
    pub id: String,
    pub name: String,
    pub pfd: f64,
    pub rrf: f64,
}

/// Complete result of one LOPA scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LopaResult {
    pub initiating_event_frequency: f64,
    pub target_frequency: f64,
    pub ipl_rrfs: Vec<IplRrf>,
    pub total_risk_reduction_factor: f64,
    pub mitigated_event_likelihood: f64,
    pub required_risk_reduction_factor: f64,
    pub gap_ratio: f64,
    pub gap_status: GapStatus,
    #[serde(rename = "requiredSIL")]
    pub required_sil: Option<SilLevel>,
    pub is_adequate: bool,
}

/// Fail with every PFD, frequency and independence problem in `input`
pub(crate) fn ensure_calculable(input: &LopaInput) -> Result<()> {
    let mut errors = validate_lopa_input(input).errors;
    for (i, ipl) in input.ipls.iter().enumerate() {
        for message in independence_errors(ipl) {
            tracing::warn!(ipl = ipl.display_name(), %message, "IPL cannot be credited");
            errors.push(prefix_ipl_error(i, ipl, &message));
        }
    }
    if !errors.is_empty() {
        return Err(LopaError::Validation(errors));
    }
    Ok(())
}

/// Run a LOPA calculation with default gap thresholds
pub fn perform_lopa_calculation(input: &LopaInput) -> Result<LopaResult> {
    perform_lopa_calculation_with_thresholds(input, &GapThresholds::default())
}

/// Run a LOPA calculation with custom gap thresholds
pub fn perform_lopa_calculation_with_thresholds(
    input: &LopaInput,
    thresholds: &GapThresholds,
) -> Result<LopaResult> {
    tracing::debug!(
        ief = input.initiating_event_frequency,
        target = input.target_frequency,
        ipls = input.ipls.len(),
        "performing LOPA calculation"
    );

    ensure_calculable(input)?;

    let ipl_rrfs = input
        .ipls
        .iter()
        .map(|ipl| {
            Ok(IplRrf {
                id: ipl.id.clone(),
                name: ipl.name.clone(),
                pfd: ipl.pfd,
                rrf: calculate_rrf(ipl.pfd)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let pfds: Vec<f64> = input.ipls.iter().map(|ipl| ipl.pfd).collect();
    let total_rrf = calculate_total_rrf(&pfds)?;
    let mel = calculate_mitigated_event_likelihood(input.initiating_event_frequency, total_rrf)?;
    let required_rrf =
        calculate_required_rrf(input.initiating_event_frequency, input.target_frequency)?;
    let gap_ratio = calculate_gap_ratio(total_rrf, required_rrf)?;
    let gap_status = determine_gap_status_with_thresholds(gap_ratio, thresholds);
    let required_sil = determine_required_sil_with_thresholds(gap_ratio, thresholds);

    tracing::debug!(
        total_rrf,
        required_rrf,
        gap_ratio,
        status = gap_status.as_str(),
        "LOPA calculation complete"
    );

    Ok(LopaResult {
        initiating_event_frequency: input.initiating_event_frequency,
        target_frequency: input.target_frequency,
        ipl_rrfs,
        total_risk_reduction_factor: total_rrf,
        mitigated_event_likelihood: mel,
        required_risk_reduction_factor: required_rrf,
        gap_ratio,
        gap_status,
        required_sil,
        is_adequate: gap_status == GapStatus::Adequate,
    })
}
