//! Independent protection layers and LOPA scenario input
//!
//! Field names on the wire are camelCase so scenario files exchanged with the
//! compliance and reporting features deserialize unchanged.

use serde::{Deserialize, Serialize};

/// Category of protection layer
///
/// Used for typical-PFD guidance and breakdown grouping only. Credit is always
/// taken from the IPL's own `pfd`, never from its type.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IplType {
    BpcsControlLoop,
    OperatorResponse,
    ReliefValve,
    RuptureDisk,
    SafetyInstrumentedFunction,
    Dike,
    FlameArrestor,
    VacuumBreaker,
    CheckValve,
    FireProtection,
    #[default]
    Other,
}

impl IplType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IplType::BpcsControlLoop => "bpcs_control_loop",
            IplType::OperatorResponse => "operator_response",
            IplType::ReliefValve => "relief_valve",
            IplType::RuptureDisk => "rupture_disk",
            IplType::SafetyInstrumentedFunction => "safety_instrumented_function",
            IplType::Dike => "dike",
            IplType::FlameArrestor => "flame_arrestor",
            IplType::VacuumBreaker => "vacuum_breaker",
            IplType::CheckValve => "check_valve",
            IplType::FireProtection => "fire_protection",
            IplType::Other => "other",
        }
    }

    /// Typical PFD credited for this kind of layer in screening-level LOPA
    ///
    /// Values follow the common CCPS generic table. A SIF's actual credit
    /// comes from its SIL verification, so 0.01 here is a placeholder for SIL 2.
    pub fn typical_pfd(&self) -> f64 {
        match self {
            IplType::BpcsControlLoop => 0.1,
            IplType::OperatorResponse => 0.1,
            IplType::ReliefValve => 0.01,
            IplType::RuptureDisk => 0.01,
            IplType::SafetyInstrumentedFunction => 0.01,
            IplType::Dike => 0.01,
            IplType::FlameArrestor => 0.01,
            IplType::VacuumBreaker => 0.01,
            IplType::CheckValve => 0.1,
            IplType::FireProtection => 0.01,
            IplType::Other => 0.1,
        }
    }
}

/// An independent protection layer as entered in a LOPA worksheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ipl {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub ipl_type: IplType,
    pub pfd: f64,
    /// `None` when the worksheet left the flag blank
    #[serde(default)]
    pub independent_of_initiator: Option<bool>,
    #[serde(default, rename = "independentOfOtherIPLs")]
    pub independent_of_other_ipls: Option<bool>,
}

impl Ipl {
    /// Create an IPL with both independence flags confirmed
    pub fn new(id: &str, name: &str, ipl_type: IplType, pfd: f64) -> Self {
        Ipl {
            id: id.to_string(),
            name: name.to_string(),
            ipl_type,
            pfd,
            independent_of_initiator: Some(true),
            independent_of_other_ipls: Some(true),
        }
    }

    /// Name used in messages and reports
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "unnamed"
        } else {
            &self.name
        }
    }

    /// Both independence flags are present and true
    pub fn is_independent(&self) -> bool {
        self.independent_of_initiator == Some(true) && self.independent_of_other_ipls == Some(true)
    }
}

/// One LOPA scenario: an initiating event, its target, and the layers credited against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LopaInput {
    /// Initiating event frequency, per year
    pub initiating_event_frequency: f64,
    /// Target mitigated event likelihood, per year
    pub target_frequency: f64,
    #[serde(default)]
    pub ipls: Vec<Ipl>,
}
