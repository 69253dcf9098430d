//! End-to-end LOPA scenario tests
//!
//! Worked scenarios run through the public entry points, from scenario JSON
//! to rendered output.

use lopa_core::analysis::{analyze_risk_reduction, analyze_risk_reduction_gap};
use lopa_core::{
    perform_lopa_calculation, render_json, GapStatus, Ipl, IplType, LopaError, LopaInput,
    SilLevel,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * b.abs().max(1.0)
}

#[test]
fn test_single_layer_short_of_target_needs_sil_2() {
    let input = LopaInput {
        initiating_event_frequency: 1.0,
        target_frequency: 1e-4,
        ipls: vec![Ipl::new("1", "PSV-101", IplType::ReliefValve, 0.01)],
    };
    let result = perform_lopa_calculation(&input).expect("valid scenario");

    assert_eq!(result.total_risk_reduction_factor, 100.0);
    assert_eq!(result.required_risk_reduction_factor, 10_000.0);
    assert_eq!(result.gap_ratio, 0.01);
    assert_eq!(result.mitigated_event_likelihood, 0.01);
    assert_eq!(result.gap_status, GapStatus::Inadequate);
    // additional RRF of exactly 100 falls in the <= 100 band
    assert_eq!(result.required_sil, Some(SilLevel::Sil2));
    assert!(!result.is_adequate);
    assert_eq!(result.ipl_rrfs.len(), 1);
    assert_eq!(result.ipl_rrfs[0].rrf, 100.0);
}

#[test]
fn test_three_layers_exceed_target() {
    let input = LopaInput {
        initiating_event_frequency: 1e-2,
        target_frequency: 1e-5,
        ipls: vec![
            Ipl::new("1", "BPCS", IplType::BpcsControlLoop, 0.1),
            Ipl::new("2", "PSV", IplType::ReliefValve, 0.01),
            Ipl::new("3", "SIF", IplType::SafetyInstrumentedFunction, 0.001),
        ],
    };
    let result = perform_lopa_calculation(&input).expect("valid scenario");

    assert!(approx(result.total_risk_reduction_factor, 1_000_000.0));
    assert!(approx(result.required_risk_reduction_factor, 1000.0));
    assert!(approx(result.gap_ratio, 1000.0));
    assert_eq!(result.gap_status, GapStatus::Adequate);
    assert_eq!(result.required_sil, None);
    assert!(result.is_adequate);
}

#[test]
fn test_ipl_order_does_not_change_result() {
    let forward = vec![
        Ipl::new("1", "BPCS", IplType::BpcsControlLoop, 0.1),
        Ipl::new("2", "Dike", IplType::Dike, 0.01),
        Ipl::new("3", "Alarm", IplType::OperatorResponse, 0.05),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = perform_lopa_calculation(&LopaInput {
        initiating_event_frequency: 0.5,
        target_frequency: 1e-5,
        ipls: forward,
    })
    .unwrap();
    let b = perform_lopa_calculation(&LopaInput {
        initiating_event_frequency: 0.5,
        target_frequency: 1e-5,
        ipls: reversed,
    })
    .unwrap();

    assert!(approx(a.total_risk_reduction_factor, b.total_risk_reduction_factor));
    assert_eq!(a.gap_status, b.gap_status);
    assert_eq!(a.required_sil, b.required_sil);
    // display order follows the input
    assert_eq!(a.ipl_rrfs[0].name, "BPCS");
    assert_eq!(b.ipl_rrfs[0].name, "Alarm");
}

#[test]
fn test_non_independent_ipl_rejected_by_calculation() {
    let mut shared = Ipl::new("2", "BPCS trip", IplType::BpcsControlLoop, 0.1);
    shared.independent_of_initiator = Some(false);

    let err = perform_lopa_calculation(&LopaInput {
        initiating_event_frequency: 0.1,
        target_frequency: 1e-4,
        ipls: vec![Ipl::new("1", "PSV", IplType::ReliefValve, 0.01), shared],
    })
    .unwrap_err();

    assert!(matches!(err, LopaError::Validation(_)));
    assert!(err.to_string().contains("IPL 2 (BPCS trip)"));
}

#[test]
fn test_non_independent_ipl_flagged_and_excluded_in_analysis() {
    let mut shared = Ipl::new("2", "BPCS trip", IplType::BpcsControlLoop, 0.1);
    shared.independent_of_initiator = Some(false);
    let ipls = vec![Ipl::new("1", "PSV", IplType::ReliefValve, 0.01), shared];

    let analysis = analyze_risk_reduction(&ipls);
    assert!(analysis
        .validation
        .errors
        .iter()
        .any(|e| e.contains("BPCS trip") && e.contains("initiating event")));
    assert!(approx(analysis.creditable_rrf, 100.0));
    assert!(approx(analysis.total_rrf, 1000.0));
}

#[test]
fn test_bad_scenario_reports_every_problem_at_once() {
    let err = perform_lopa_calculation(&LopaInput {
        initiating_event_frequency: 500.0,
        target_frequency: 0.0,
        ipls: vec![
            Ipl::new("1", "A", IplType::Other, 0.0),
            Ipl::new("2", "B", IplType::Other, 1.5),
        ],
    })
    .unwrap_err();

    match err {
        LopaError::Validation(errors) => assert_eq!(errors.len(), 4, "{:?}", errors),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_scenario_json_round_trip_through_calculation() {
    let json = r#"{
        "initiatingEventFrequency": 0.1,
        "targetFrequency": 1e-5,
        "ipls": [
            {"id": "a", "name": "LAH-100 + operator", "type": "operator_response", "pfd": 0.1,
             "independentOfInitiator": true, "independentOfOtherIPLs": true},
            {"id": "b", "name": "PSV-100", "type": "relief_valve", "pfd": 0.01,
             "independentOfInitiator": true, "independentOfOtherIPLs": true}
        ]
    }"#;
    let input: LopaInput = serde_json::from_str(json).unwrap();
    let result = perform_lopa_calculation(&input).unwrap();
    assert_eq!(result.gap_status, GapStatus::Inadequate);
    assert_eq!(result.required_sil, Some(SilLevel::Sil1));

    let rendered: serde_json::Value = serde_json::from_str(&render_json(&result)).unwrap();
    assert_eq!(rendered["gapStatus"], "inadequate");
    assert_eq!(rendered["requiredSIL"], 1);
    assert_eq!(rendered["iplRrfs"][1]["name"], "PSV-100");
}

#[test]
fn test_gap_analysis_matches_calculation() {
    let input = LopaInput {
        initiating_event_frequency: 1.0,
        target_frequency: 1e-4,
        ipls: vec![Ipl::new("1", "PSV", IplType::ReliefValve, 0.01)],
    };
    let result = perform_lopa_calculation(&input).unwrap();
    let gap = analyze_risk_reduction_gap(
        result.total_risk_reduction_factor,
        result.required_risk_reduction_factor,
    )
    .unwrap();

    assert_eq!(gap.gap_status, result.gap_status);
    assert_eq!(gap.required_sil, result.required_sil);
    assert_eq!(gap.additional_rrf_needed, 100.0);
}
