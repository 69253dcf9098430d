//! Risk reduction analysis over IPL collections
//!
//! Global invariants enforced:
//! - Only IPLs that are independent on both counts and carry a valid PFD are credited
//! - Contributions are apportioned in orders of magnitude, since RRFs multiply
//! - Recommendations are fixed templates keyed by gap status
//! - Breakdown ordering is deterministic (input order per IPL, enum order per type)

use crate::error::{LopaError, Result};
use crate::format::{format_orders_of_magnitude, format_rrf};
use crate::ipl::{Ipl, IplType, LopaInput};
use crate::lopa::ensure_calculable;
use crate::rrf::{
    additional_rrf_needed_with_thresholds, calculate_gap_ratio, calculate_orders_of_magnitude,
    calculate_required_rrf, determine_gap_status_with_thresholds,
    determine_required_sil_with_thresholds, GapStatus, GapThresholds,
};
use crate::sil::SilLevel;
use crate::validation::{is_valid_pfd, validate_ipls, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-IPL share of the credited risk reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IplContribution {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ipl_type: IplType,
    pub pfd: f64,
    /// Screening PFD for this kind of layer, for comparison with the claim
    pub typical_pfd: f64,
    /// `None` when the PFD is outside the creditable band
    pub rrf: Option<f64>,
    pub orders_of_magnitude: f64,
    pub creditable: bool,
    pub contribution_percent: f64,
}

/// Credited risk reduction grouped by IPL type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeContribution {
    #[serde(rename = "type")]
    pub ipl_type: IplType,
    pub count: usize,
    pub combined_rrf: f64,
    pub orders_of_magnitude: f64,
    pub contribution_percent: f64,
}

/// Collection-level analysis of a set of IPLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReductionAnalysis {
    pub validation: ValidationResult,
    /// RRF of every IPL with a valid PFD, independent or not (audit figure)
    pub total_rrf: f64,
    /// RRF of the IPLs that may actually be credited
    pub creditable_rrf: f64,
    pub creditable_count: usize,
    pub contributions: Vec<IplContribution>,
    pub by_type: Vec<TypeContribution>,
}

/// `1 / Π pfd`, the identity for no PFDs
fn combined_rrf<I: IntoIterator<Item = f64>>(pfds: I) -> f64 {
    let product: f64 = pfds.into_iter().product();
    1.0 / product
}

fn percent_of(orders: f64, total_orders: f64) -> f64 {
    if total_orders > 0.0 {
        orders / total_orders * 100.0
    } else {
        0.0
    }
}

fn is_creditable(ipl: &Ipl) -> bool {
    is_valid_pfd(ipl.pfd) && ipl.is_independent()
}

/// Validate a set of IPLs and apportion their credited risk reduction
pub fn analyze_risk_reduction(ipls: &[Ipl]) -> RiskReductionAnalysis {
    let validation = validate_ipls(ipls);

    let total_rrf = combined_rrf(ipls.iter().map(|i| i.pfd).filter(|&p| is_valid_pfd(p)));
    let creditable: Vec<&Ipl> = ipls.iter().filter(|i| is_creditable(i)).collect();
    let creditable_rrf = combined_rrf(creditable.iter().map(|i| i.pfd));
    let creditable_orders = calculate_orders_of_magnitude(creditable_rrf);

    let contributions = ipls
        .iter()
        .map(|ipl| {
            let credited = is_creditable(ipl);
            if !ipl.is_independent() {
                tracing::warn!(ipl = ipl.display_name(), "IPL excluded from credited RRF");
            }
            let rrf = is_valid_pfd(ipl.pfd).then_some(1.0 / ipl.pfd);
            let orders = rrf.map(calculate_orders_of_magnitude).unwrap_or(0.0);
            IplContribution {
                id: ipl.id.clone(),
                name: ipl.name.clone(),
                ipl_type: ipl.ipl_type,
                pfd: ipl.pfd,
                typical_pfd: ipl.ipl_type.typical_pfd(),
                rrf,
                orders_of_magnitude: orders,
                creditable: credited,
                contribution_percent: if credited {
                    percent_of(orders, creditable_orders)
                } else {
                    0.0
                },
            }
        })
        .collect();

    let mut grouped: BTreeMap<IplType, Vec<f64>> = BTreeMap::new();
    for ipl in &creditable {
        grouped.entry(ipl.ipl_type).or_default().push(ipl.pfd);
    }
    let by_type = grouped
        .into_iter()
        .map(|(ipl_type, pfds)| {
            let count = pfds.len();
            let rrf = combined_rrf(pfds);
            let orders = calculate_orders_of_magnitude(rrf);
            TypeContribution {
                ipl_type,
                count,
                combined_rrf: rrf,
                orders_of_magnitude: orders,
                contribution_percent: percent_of(orders, creditable_orders),
            }
        })
        .collect();

    tracing::debug!(
        ipls = ipls.len(),
        creditable = creditable.len(),
        total_rrf,
        creditable_rrf,
        "risk reduction analyzed"
    );

    RiskReductionAnalysis {
        validation,
        total_rrf,
        creditable_rrf,
        creditable_count: creditable.len(),
        contributions,
        by_type,
    }
}

/// Gap between achieved and required risk reduction, with operator guidance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub actual_rrf: f64,
    pub required_rrf: f64,
    pub gap_ratio: f64,
    pub gap_status: GapStatus,
    #[serde(rename = "requiredSIL")]
    pub required_sil: Option<SilLevel>,
    /// `adequate threshold / gap ratio`, 0 when already adequate
    pub additional_rrf_needed: f64,
    pub recommendations: Vec<String>,
}

pub fn analyze_risk_reduction_gap(actual_rrf: f64, required_rrf: f64) -> Result<GapAnalysis> {
    analyze_risk_reduction_gap_with_thresholds(actual_rrf, required_rrf, &GapThresholds::default())
}

pub fn analyze_risk_reduction_gap_with_thresholds(
    actual_rrf: f64,
    required_rrf: f64,
    thresholds: &GapThresholds,
) -> Result<GapAnalysis> {
    if actual_rrf.is_nan() || actual_rrf <= 0.0 {
        return Err(LopaError::NonPositiveActualRrf(actual_rrf));
    }
    let gap_ratio = calculate_gap_ratio(actual_rrf, required_rrf)?;
    let gap_status = determine_gap_status_with_thresholds(gap_ratio, thresholds);
    let additional = additional_rrf_needed_with_thresholds(gap_ratio, thresholds);
    let required_sil = determine_required_sil_with_thresholds(gap_ratio, thresholds);
    let additional_rrf_needed = additional.unwrap_or(0.0);

    Ok(GapAnalysis {
        actual_rrf,
        required_rrf,
        gap_ratio,
        gap_status,
        required_sil,
        additional_rrf_needed,
        recommendations: recommended_actions(gap_status, required_sil, additional_rrf_needed),
    })
}

/// Operator-facing actions for a gap status
pub fn recommended_actions(
    status: GapStatus,
    required_sil: Option<SilLevel>,
    additional_rrf_needed: f64,
) -> Vec<String> {
    let sil = required_sil.unwrap_or(SilLevel::Sil1);
    let additional = format!(
        "{} ({})",
        format_rrf(additional_rrf_needed),
        format_orders_of_magnitude(calculate_orders_of_magnitude(additional_rrf_needed))
    );

    match status {
        GapStatus::Adequate => vec![
            "Maintain existing IPLs through their proof-test and inspection schedule".to_string(),
            "Document the LOPA basis, PFD sources and independence justification".to_string(),
        ],
        GapStatus::Marginal => vec![
            "Review IPL independence and PFD claims before accepting the residual risk"
                .to_string(),
            format!(
                "Consider an additional {} safety instrumented function providing an RRF of {}",
                sil, additional
            ),
            "Submit the scenario for management of change (MOC) review".to_string(),
        ],
        GapStatus::Inadequate => vec![
            format!(
                "Additional risk reduction is mandatory: an RRF of {} is still required",
                additional
            ),
            format!(
                "Specify a {} safety instrumented function or an equivalent engineered safeguard",
                sil
            ),
            "Do not start up or continue operation until the risk gap is closed".to_string(),
            "Convene a mandatory LOPA review meeting with the HazOp team".to_string(),
        ],
    }
}

/// How many homogeneous IPLs of one SIL tier would close a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IplCountEstimate {
    pub sil: SilLevel,
    pub typical_rrf: f64,
    pub count: u32,
    pub combined_rrf: f64,
}

/// Planning estimate for a scenario's outstanding risk reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RrfRequirement {
    pub required_rrf: f64,
    pub required_orders_of_magnitude: f64,
    /// Credited RRF of the scenario's existing IPLs
    pub existing_rrf: f64,
    /// RRF still needed after existing credit, never below 1
    pub remaining_rrf: f64,
    pub options: Vec<IplCountEstimate>,
}

/// Estimate IPLs of `sil`'s typical RRF needed to reach `required_rrf`
///
/// `count = ceil(orders(required) / orders(typical))`. Approximate: assumes
/// every added layer sits at the same tier.
pub fn estimate_ipl_count(required_rrf: f64, sil: SilLevel) -> IplCountEstimate {
    let typical_rrf = sil.typical_rrf();
    let count = if required_rrf <= 1.0 {
        0
    } else {
        let ratio = calculate_orders_of_magnitude(required_rrf)
            / calculate_orders_of_magnitude(typical_rrf);
        ratio.ceil() as u32
    };
    IplCountEstimate {
        sil,
        typical_rrf,
        count,
        combined_rrf: typical_rrf.powi(count as i32),
    }
}

/// Outstanding RRF for a scenario and per-SIL layer counts to close it
///
/// Fails like `perform_lopa_calculation` when the scenario has any
/// validation or independence error, so every existing IPL is credited.
pub fn calculate_rrf_requirement(input: &LopaInput) -> Result<RrfRequirement> {
    ensure_calculable(input)?;
    let required_rrf =
        calculate_required_rrf(input.initiating_event_frequency, input.target_frequency)?;
    let existing_rrf = combined_rrf(input.ipls.iter().map(|i| i.pfd));
    let remaining_rrf = (required_rrf / existing_rrf).max(1.0);

    Ok(RrfRequirement {
        required_rrf,
        required_orders_of_magnitude: calculate_orders_of_magnitude(required_rrf),
        existing_rrf,
        remaining_rrf,
        options: SilLevel::ALL
            .iter()
            .map(|&sil| estimate_ipl_count(remaining_rrf, sil))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn test_contributions_are_logarithmic() {
        let ipls = vec![
            Ipl::new("1", "BPCS", IplType::BpcsControlLoop, 0.1),
            Ipl::new("2", "PSV", IplType::ReliefValve, 0.01),
        ];
        let analysis = analyze_risk_reduction(&ipls);
        assert!(analysis.validation.valid);
        assert!(approx(analysis.creditable_rrf, 1000.0));
        // 1 of 3 orders, 2 of 3 orders
        assert!(approx(analysis.contributions[0].contribution_percent, 100.0 / 3.0));
        assert!(approx(analysis.contributions[1].contribution_percent, 200.0 / 3.0));
    }

    #[test]
    fn test_non_independent_ipl_is_flagged_and_not_credited() {
        let mut alarm = Ipl::new("2", "High level alarm", IplType::OperatorResponse, 0.1);
        alarm.independent_of_initiator = Some(false);
        let ipls = vec![Ipl::new("1", "PSV", IplType::ReliefValve, 0.01), alarm];

        let analysis = analyze_risk_reduction(&ipls);
        assert!(!analysis.validation.valid);
        assert!(analysis.validation.errors[0].contains("High level alarm"));
        assert!(approx(analysis.creditable_rrf, 100.0));
        assert!(approx(analysis.total_rrf, 1000.0));
        assert_eq!(analysis.creditable_count, 1);
        assert!(!analysis.contributions[1].creditable);
        assert_eq!(analysis.contributions[1].contribution_percent, 0.0);
        assert!(approx(analysis.contributions[0].contribution_percent, 100.0));
    }

    #[test]
    fn test_contributions_carry_typical_pfd() {
        let ipls = vec![
            Ipl::new("1", "BPCS", IplType::BpcsControlLoop, 0.05),
            Ipl::new("2", "PSV", IplType::ReliefValve, 0.001),
        ];
        let analysis = analyze_risk_reduction(&ipls);
        assert_eq!(analysis.contributions[0].typical_pfd, 0.1);
        assert_eq!(analysis.contributions[1].typical_pfd, 0.01);
    }

    #[test]
    fn test_invalid_pfd_has_no_rrf() {
        let ipls = vec![Ipl::new("1", "Mystery", IplType::Other, 4.0)];
        let analysis = analyze_risk_reduction(&ipls);
        assert_eq!(analysis.contributions[0].rrf, None);
        assert_eq!(analysis.total_rrf, 1.0);
        assert_eq!(analysis.creditable_rrf, 1.0);
        assert!(analysis.by_type.is_empty());
    }

    #[test]
    fn test_by_type_groups_credited_layers() {
        let ipls = vec![
            Ipl::new("1", "PSV-A", IplType::ReliefValve, 0.01),
            Ipl::new("2", "BPCS", IplType::BpcsControlLoop, 0.1),
            Ipl::new("3", "PSV-B", IplType::ReliefValve, 0.01),
        ];
        let analysis = analyze_risk_reduction(&ipls);
        assert_eq!(analysis.by_type.len(), 2);
        assert_eq!(analysis.by_type[0].ipl_type, IplType::BpcsControlLoop);
        let relief = &analysis.by_type[1];
        assert_eq!(relief.count, 2);
        assert!(approx(relief.combined_rrf, 10_000.0));
        assert!(approx(relief.contribution_percent, 80.0));
    }

    #[test]
    fn test_gap_adequate_needs_nothing() {
        let gap = analyze_risk_reduction_gap(1000.0, 100.0).unwrap();
        assert_eq!(gap.gap_status, GapStatus::Adequate);
        assert_eq!(gap.required_sil, None);
        assert_eq!(gap.additional_rrf_needed, 0.0);
        assert_eq!(gap.recommendations.len(), 2);
    }

    #[test]
    fn test_gap_marginal_requires_moc() {
        let gap = analyze_risk_reduction_gap(60.0, 100.0).unwrap();
        assert_eq!(gap.gap_status, GapStatus::Marginal);
        assert!(approx(gap.additional_rrf_needed, 100.0 / 60.0));
        assert!(gap.recommendations.iter().any(|r| r.contains("independence")));
        assert!(gap.recommendations.iter().any(|r| r.contains("SIL 1")));
        assert!(gap.recommendations.iter().any(|r| r.contains("MOC")));
    }

    #[test]
    fn test_gap_inadequate_forbids_start_up() {
        let gap = analyze_risk_reduction_gap(10.0, 10_000.0).unwrap();
        assert_eq!(gap.gap_status, GapStatus::Inadequate);
        assert_eq!(gap.required_sil, Some(SilLevel::Sil3));
        assert!(approx(gap.additional_rrf_needed, 1000.0));
        assert!(gap.recommendations[0].contains("1.0K"));
        assert!(gap
            .recommendations
            .iter()
            .any(|r| r.starts_with("Do not start up")));
        assert!(gap.recommendations.iter().any(|r| r.contains("LOPA review")));
    }

    #[test]
    fn test_gap_guidance_follows_configured_adequate_threshold() {
        let thresholds = GapThresholds {
            marginal: 0.5,
            adequate: 2.0,
        };
        let gap = analyze_risk_reduction_gap_with_thresholds(150.0, 100.0, &thresholds).unwrap();
        assert_eq!(gap.gap_status, GapStatus::Marginal);
        assert_eq!(gap.required_sil, Some(SilLevel::Sil1));
        // 2.0 / 1.5 lifts the ratio exactly to the adequate threshold
        assert!(approx(gap.additional_rrf_needed, 2.0 / 1.5));
        assert!(gap.additional_rrf_needed > 1.0);
        assert!(gap.recommendations.iter().all(|r| !r.contains("-0.")));
    }

    #[test]
    fn test_gap_rejects_nan_inputs() {
        assert!(matches!(
            analyze_risk_reduction_gap(f64::NAN, 100.0),
            Err(LopaError::NonPositiveActualRrf(_))
        ));
        assert!(matches!(
            analyze_risk_reduction_gap(10.0, f64::NAN),
            Err(LopaError::NonPositiveRequiredRrf(_))
        ));
    }

    #[test]
    fn test_gap_rejects_non_positive_inputs() {
        assert_eq!(
            analyze_risk_reduction_gap(0.0, 100.0),
            Err(LopaError::NonPositiveActualRrf(0.0))
        );
        assert_eq!(
            analyze_risk_reduction_gap(10.0, 0.0),
            Err(LopaError::NonPositiveRequiredRrf(0.0))
        );
    }

    #[test]
    fn test_estimate_ipl_count() {
        // log10(5000) / log10(200) = 1.6
        let sil2 = estimate_ipl_count(5000.0, SilLevel::Sil2);
        assert_eq!(sil2.count, 2);
        assert!(approx(sil2.combined_rrf, 40_000.0));

        let sil3 = estimate_ipl_count(5000.0, SilLevel::Sil3);
        assert_eq!(sil3.count, 2);

        let sil4 = estimate_ipl_count(5000.0, SilLevel::Sil4);
        assert_eq!(sil4.count, 1);

        let none = estimate_ipl_count(0.8, SilLevel::Sil1);
        assert_eq!(none.count, 0);
        assert_eq!(none.combined_rrf, 1.0);
    }

    #[test]
    fn test_rrf_requirement_uses_existing_credit() {
        let input = LopaInput {
            initiating_event_frequency: 0.5,
            target_frequency: 1e-5,
            ipls: vec![Ipl::new("1", "PSV", IplType::ReliefValve, 0.01)],
        };
        let requirement = calculate_rrf_requirement(&input).unwrap();
        assert!(approx(requirement.required_rrf, 50_000.0));
        assert!(approx(requirement.existing_rrf, 100.0));
        assert!(approx(requirement.remaining_rrf, 500.0));
        assert_eq!(requirement.options.len(), 4);
        // log10(500) / log10(20) = 2.07
        assert_eq!(requirement.options[0].count, 3);
        assert_eq!(requirement.options[1].count, 2);
        assert_eq!(requirement.options[2].count, 1);
    }

    #[test]
    fn test_rrf_requirement_already_met() {
        let input = LopaInput {
            initiating_event_frequency: 0.1,
            target_frequency: 1e-2,
            ipls: vec![Ipl::new("1", "PSV", IplType::ReliefValve, 0.01)],
        };
        let requirement = calculate_rrf_requirement(&input).unwrap();
        assert_eq!(requirement.remaining_rrf, 1.0);
        assert!(requirement.options.iter().all(|o| o.count == 0));
    }

    #[test]
    fn test_rrf_requirement_rejects_invalid_scenario() {
        let input = LopaInput {
            initiating_event_frequency: 500.0,
            target_frequency: 2.0,
            ipls: vec![Ipl::new("1", "Mystery", IplType::Other, 7.0)],
        };
        match calculate_rrf_requirement(&input) {
            Err(LopaError::Validation(errors)) => assert_eq!(errors.len(), 3, "{:?}", errors),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rrf_requirement_rejects_non_independent_ipl() {
        let mut shared = Ipl::new("2", "Shared BPCS", IplType::BpcsControlLoop, 0.1);
        shared.independent_of_other_ipls = Some(false);
        let input = LopaInput {
            initiating_event_frequency: 0.5,
            target_frequency: 1e-5,
            ipls: vec![Ipl::new("1", "PSV", IplType::ReliefValve, 0.01), shared],
        };
        let err = calculate_rrf_requirement(&input).unwrap_err();
        assert!(err.to_string().contains("IPL 2 (Shared BPCS)"));
    }
}
