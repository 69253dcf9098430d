//! Deciding whether a HazOp scenario needs LOPA, and its target frequency
//!
//! Severity and likelihood are the 1..=5 ranks from the study's risk matrix.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 5;

/// Qualitative risk level from the risk-ranking step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Extreme => "extreme",
        }
    }
}

/// Output of the prior risk-ranking step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRanking {
    pub severity: u8,
    pub likelihood: u8,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub risk_score: Option<f64>,
}

/// Configurable LOPA trigger rules
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerThresholds {
    /// Severity at or above which LOPA is always required
    pub always_severity: u8,
    /// Severity that triggers LOPA when paired with `combined_likelihood`
    pub combined_severity: u8,
    pub combined_likelihood: u8,
    /// Risk levels that trigger LOPA regardless of severity
    pub risk_levels: Vec<RiskLevel>,
    /// Risk score at or above which LOPA is required
    pub risk_score: f64,
}

impl Default for TriggerThresholds {
    fn default() -> Self {
        TriggerThresholds {
            always_severity: 4,
            combined_severity: 3,
            combined_likelihood: 4,
            risk_levels: vec![RiskLevel::High, RiskLevel::Extreme],
            risk_score: 15.0,
        }
    }
}

/// Target mitigated event likelihood per severity rank
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityTargets {
    targets: BTreeMap<u8, f64>,
}

impl Default for SeverityTargets {
    fn default() -> Self {
        SeverityTargets {
            targets: BTreeMap::from([(1, 1e-2), (2, 1e-3), (3, 1e-4), (4, 1e-5), (5, 1e-6)]),
        }
    }
}

impl SeverityTargets {
    /// Default table with `overrides` applied on top
    pub fn with_overrides(overrides: &BTreeMap<u8, f64>) -> Self {
        let mut targets = SeverityTargets::default().targets;
        targets.extend(overrides.iter().map(|(k, v)| (*k, *v)));
        SeverityTargets { targets }
    }

    pub fn get(&self, severity: u8) -> Option<f64> {
        self.targets.get(&severity).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.targets.iter().map(|(k, v)| (*k, *v))
    }
}

/// Target frequency for a severity rank using the default table
pub fn get_target_frequency_for_severity(severity: u8) -> Option<f64> {
    SeverityTargets::default().get(severity)
}

/// Decision on whether a scenario proceeds to LOPA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LopaTrigger {
    pub required: bool,
    pub reason: String,
}

pub fn check_lopa_trigger(ranking: &RiskRanking) -> LopaTrigger {
    check_lopa_trigger_with_thresholds(ranking, &TriggerThresholds::default())
}

pub fn check_lopa_trigger_with_thresholds(
    ranking: &RiskRanking,
    thresholds: &TriggerThresholds,
) -> LopaTrigger {
    let trigger = |reason: String| LopaTrigger {
        required: true,
        reason,
    };

    if ranking.severity >= thresholds.always_severity {
        return trigger(format!(
            "severity {} is at or above {}; LOPA is always required",
            ranking.severity, thresholds.always_severity
        ));
    }

    if ranking.severity >= thresholds.combined_severity
        && ranking.likelihood >= thresholds.combined_likelihood
    {
        return trigger(format!(
            "severity {} with likelihood {} requires LOPA",
            ranking.severity, ranking.likelihood
        ));
    }

    if let Some(level) = ranking.risk_level {
        if thresholds.risk_levels.contains(&level) {
            return trigger(format!("risk level '{}' requires LOPA", level.as_str()));
        }
    }

    if let Some(score) = ranking.risk_score {
        if score >= thresholds.risk_score {
            return trigger(format!(
                "risk score {} is at or above {}",
                score, thresholds.risk_score
            ));
        }
    }

    LopaTrigger {
        required: false,
        reason: "risk ranking is below every LOPA trigger".to_string(),
    }
}
