//! Text and JSON renderings of LOPA results
//!
//! Global invariants enforced:
//! - Deterministic output ordering (input order for IPLs, enum order for types)
//! - Byte-for-byte identical output across runs

use crate::analysis::{GapAnalysis, RiskReductionAnalysis, RrfRequirement};
use crate::format::{format_frequency, format_orders_of_magnitude, format_pfd, format_rrf};
use crate::lopa::LopaResult;
use crate::rrf::calculate_orders_of_magnitude;
use crate::sil::SilLevel;
use serde::Serialize;

fn sil_or_none(sil: Option<SilLevel>) -> String {
    sil.map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Render a LOPA calculation result as text
pub fn render_text(result: &LopaResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<8} {:<24} {:<10} {}\n",
        "IPL", "NAME", "PFD", "RRF"
    ));
    for (i, ipl) in result.ipl_rrfs.iter().enumerate() {
        output.push_str(&format!(
            "{:<8} {:<24} {:<10} {}\n",
            i + 1,
            truncate_or_pad(&ipl.name, 24),
            format_pfd(ipl.pfd),
            format_rrf(ipl.rrf)
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "Initiating event frequency: {}\n",
        format_frequency(result.initiating_event_frequency)
    ));
    output.push_str(&format!(
        "Target frequency:           {}\n",
        format_frequency(result.target_frequency)
    ));
    output.push_str(&format!(
        "Total RRF:                  {} ({})\n",
        format_rrf(result.total_risk_reduction_factor),
        format_orders_of_magnitude(calculate_orders_of_magnitude(
            result.total_risk_reduction_factor
        ))
    ));
    output.push_str(&format!(
        "Mitigated event likelihood: {}\n",
        format_frequency(result.mitigated_event_likelihood)
    ));
    output.push_str(&format!(
        "Required RRF:               {}\n",
        format_rrf(result.required_risk_reduction_factor)
    ));
    output.push_str(&format!(
        "Gap ratio:                  {:.3}\n",
        result.gap_ratio
    ));
    output.push_str(&format!(
        "Status:                     {}\n",
        result.gap_status.as_str()
    ));
    output.push_str(&format!(
        "Required SIL:               {}\n",
        sil_or_none(result.required_sil)
    ));

    output
}

/// Render a collection analysis as text
pub fn render_analysis_text(analysis: &RiskReductionAnalysis) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<8} {:<24} {:<30} {:<10} {:<10} {:<8} {:<8} {}\n",
        "IPL", "NAME", "TYPE", "PFD", "TYPICAL", "RRF", "CREDIT", "SHARE"
    ));
    for (i, c) in analysis.contributions.iter().enumerate() {
        output.push_str(&format!(
            "{:<8} {:<24} {:<30} {:<10} {:<10} {:<8} {:<8} {:.1}%\n",
            i + 1,
            truncate_or_pad(&c.name, 24),
            c.ipl_type.as_str(),
            format_pfd(c.pfd),
            format_pfd(c.typical_pfd),
            c.rrf.map(format_rrf).unwrap_or_else(|| "-".to_string()),
            if c.creditable { "yes" } else { "no" },
            c.contribution_percent
        ));
    }
    output.push('\n');

    if !analysis.by_type.is_empty() {
        output.push_str(&format!(
            "{:<30} {:<6} {:<8} {}\n",
            "TYPE", "COUNT", "RRF", "SHARE"
        ));
        for t in &analysis.by_type {
            output.push_str(&format!(
                "{:<30} {:<6} {:<8} {:.1}%\n",
                t.ipl_type.as_str(),
                t.count,
                format_rrf(t.combined_rrf),
                t.contribution_percent
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Creditable RRF: {} from {} of {} IPLs\n",
        format_rrf(analysis.creditable_rrf),
        analysis.creditable_count,
        analysis.contributions.len()
    ));
    output.push_str(&format!(
        "Total RRF (all valid PFDs): {}\n",
        format_rrf(analysis.total_rrf)
    ));

    if !analysis.validation.errors.is_empty() {
        output.push_str("\nValidation errors:\n");
        for e in &analysis.validation.errors {
            output.push_str(&format!("  - {}\n", e));
        }
    }

    output
}

/// Render a gap analysis as text
pub fn render_gap_text(gap: &GapAnalysis) -> String {
    let mut output = String::new();
    output.push_str(&format!("Actual RRF:     {}\n", format_rrf(gap.actual_rrf)));
    output.push_str(&format!("Required RRF:   {}\n", format_rrf(gap.required_rrf)));
    output.push_str(&format!("Gap ratio:      {:.3}\n", gap.gap_ratio));
    output.push_str(&format!("Status:         {}\n", gap.gap_status.as_str()));
    output.push_str(&format!(
        "Required SIL:   {}\n",
        sil_or_none(gap.required_sil)
    ));
    if gap.additional_rrf_needed > 0.0 {
        output.push_str(&format!(
            "Additional RRF: {}\n",
            format_rrf(gap.additional_rrf_needed)
        ));
    }
    output.push_str("\nRecommended actions:\n");
    for (i, r) in gap.recommendations.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, r));
    }
    output
}

/// Render a planning estimate as text
pub fn render_requirement_text(requirement: &RrfRequirement) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Required RRF:  {} ({})\n",
        format_rrf(requirement.required_rrf),
        format_orders_of_magnitude(requirement.required_orders_of_magnitude)
    ));
    output.push_str(&format!(
        "Existing RRF:  {}\n",
        format_rrf(requirement.existing_rrf)
    ));
    output.push_str(&format!(
        "Remaining RRF: {}\n\n",
        format_rrf(requirement.remaining_rrf)
    ));
    output.push_str(&format!(
        "{:<8} {:<12} {:<6} {}\n",
        "SIL", "TYPICAL RRF", "COUNT", "COMBINED RRF"
    ));
    for option in &requirement.options {
        output.push_str(&format!(
            "{:<8} {:<12} {:<6} {}\n",
            option.sil.to_string(),
            format_rrf(option.typical_rrf),
            option.count,
            format_rrf(option.combined_rrf)
        ));
    }
    output
}

/// Render any result as pretty JSON
pub fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze_risk_reduction, analyze_risk_reduction_gap};
    use crate::ipl::{Ipl, IplType, LopaInput};
    use crate::lopa::perform_lopa_calculation;

    fn scenario() -> LopaResult {
        perform_lopa_calculation(&LopaInput {
            initiating_event_frequency: 0.15,
            target_frequency: 1e-4,
            ipls: vec![
                Ipl::new("1", "BPCS level control", IplType::BpcsControlLoop, 0.1),
                Ipl::new("2", "PSV-101", IplType::ReliefValve, 0.01),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_render_text_contains_key_figures() {
        let text = render_text(&scenario());
        assert!(text.contains("PSV-101"));
        assert!(text.contains("1.0e-2"));
        assert!(text.contains("Total RRF:                  1.0K (3.0 orders)"));
        assert!(text.contains("Status:                     marginal"));
        assert!(text.contains("Required SIL:               SIL 1"));
    }

    #[test]
    fn test_render_text_is_deterministic() {
        assert_eq!(render_text(&scenario()), render_text(&scenario()));
    }

    #[test]
    fn test_render_json_uses_wire_names() {
        let json = render_json(&scenario());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["gapStatus"], "marginal");
        assert_eq!(value["requiredSIL"], 1);
        assert_eq!(value["isAdequate"], false);
        assert!(value["totalRiskReductionFactor"].is_number());
    }

    #[test]
    fn test_render_analysis_lists_validation_errors() {
        let mut alarm = Ipl::new("1", "Alarm", IplType::OperatorResponse, 0.1);
        alarm.independent_of_initiator = Some(false);
        let text = render_analysis_text(&analyze_risk_reduction(&[alarm]));
        assert!(text.contains("Validation errors:"));
        assert!(text.contains("IPL 1 (Alarm)"));
    }

    #[test]
    fn test_render_analysis_shows_typical_pfd() {
        let psv = Ipl::new("1", "PSV-101", IplType::ReliefValve, 0.001);
        let text = render_analysis_text(&analyze_risk_reduction(&[psv]));
        assert!(text.contains("TYPICAL"));
        // claimed 1.0e-3 against the 1.0e-2 screening value
        assert!(text.contains("1.0e-3     1.0e-2"));
    }

    #[test]
    fn test_render_gap_numbers_actions() {
        let text = render_gap_text(&analyze_risk_reduction_gap(10.0, 10_000.0).unwrap());
        assert!(text.contains("Status:         inadequate"));
        assert!(text.contains("  3. Do not start up"));
    }

    #[test]
    fn test_truncate_or_pad() {
        assert_eq!(truncate_or_pad("abc", 5), "abc  ");
        assert_eq!(truncate_or_pad("abcdefgh", 6), "abc...");
    }
}
