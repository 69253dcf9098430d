//! Advisory validation of IPLs and scenario inputs
//!
//! Nothing here fails: every check appends a human-readable message so a form
//! can show all problems at once. The fail-fast policy lives in `lopa`.

use crate::ipl::{Ipl, LopaInput};
use serde::{Deserialize, Serialize};

/// Smallest PFD any single layer may be credited with
pub const MIN_CREDITABLE_PFD: f64 = 1e-5;
/// Largest meaningful PFD (a layer that never works)
pub const MAX_CREDITABLE_PFD: f64 = 1.0;

pub const MIN_INITIATING_EVENT_FREQUENCY: f64 = 1e-8;
pub const MAX_INITIATING_EVENT_FREQUENCY: f64 = 100.0;
pub const MAX_TARGET_FREQUENCY: f64 = 1.0;

/// Outcome of an advisory validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        ValidationResult {
            valid: errors.is_empty(),
            errors,
        }
    }
}

pub fn is_valid_pfd(pfd: f64) -> bool {
    pfd.is_finite() && (MIN_CREDITABLE_PFD..=MAX_CREDITABLE_PFD).contains(&pfd)
}

pub fn is_valid_initiating_event_frequency(frequency: f64) -> bool {
    frequency.is_finite()
        && (MIN_INITIATING_EVENT_FREQUENCY..=MAX_INITIATING_EVENT_FREQUENCY).contains(&frequency)
}

/// Target frequency must lie in `(0, 1]` per year
pub fn is_valid_target_frequency(frequency: f64) -> bool {
    frequency.is_finite() && frequency > 0.0 && frequency <= MAX_TARGET_FREQUENCY
}

fn pfd_error(pfd: f64) -> String {
    format!(
        "PFD {} is outside the creditable range [{}, {}]",
        pfd, MIN_CREDITABLE_PFD, MAX_CREDITABLE_PFD
    )
}

/// Independence problems for a single IPL
///
/// A missing flag and a `false` flag are reported differently: the first is
/// incomplete data, the second disqualifies the layer from any credit.
pub fn independence_errors(ipl: &Ipl) -> Vec<String> {
    let mut errors = Vec::new();

    match ipl.independent_of_initiator {
        None => errors.push("independence from the initiating event must be specified".to_string()),
        Some(false) => errors.push(
            "not independent of the initiating event; cannot be credited as an IPL".to_string(),
        ),
        Some(true) => {}
    }

    match ipl.independent_of_other_ipls {
        None => errors.push("independence from other IPLs must be specified".to_string()),
        Some(false) => errors.push(
            "not independent of other IPLs; shared components or common cause failure prevent credit"
                .to_string(),
        ),
        Some(true) => {}
    }

    errors
}

/// Validate one IPL: PFD band plus both independence flags
pub fn validate_ipl(ipl: &Ipl) -> ValidationResult {
    let mut errors = Vec::new();
    if !is_valid_pfd(ipl.pfd) {
        errors.push(pfd_error(ipl.pfd));
    }
    errors.extend(independence_errors(ipl));
    ValidationResult::from_errors(errors)
}

/// `IPL <n> (<name>): <message>` with a 1-based position
pub(crate) fn prefix_ipl_error(index: usize, ipl: &Ipl, message: &str) -> String {
    format!("IPL {} ({}): {}", index + 1, ipl.display_name(), message)
}

/// Validate every IPL, tagging each message with its 1-based position and name
pub fn validate_ipls(ipls: &[Ipl]) -> ValidationResult {
    let errors = ipls
        .iter()
        .enumerate()
        .flat_map(|(i, ipl)| {
            validate_ipl(ipl)
                .errors
                .into_iter()
                .map(move |e| prefix_ipl_error(i, ipl, &e))
        })
        .collect();
    ValidationResult::from_errors(errors)
}

/// Validate a scenario's frequencies and IPL PFDs
///
/// Independence is not checked here; see `validate_ipls`.
pub fn validate_lopa_input(input: &LopaInput) -> ValidationResult {
    let mut errors = Vec::new();

    if !is_valid_initiating_event_frequency(input.initiating_event_frequency) {
        errors.push(format!(
            "initiating event frequency {} is outside the valid range [{}, {}] per year",
            input.initiating_event_frequency,
            MIN_INITIATING_EVENT_FREQUENCY,
            MAX_INITIATING_EVENT_FREQUENCY
        ));
    }

    if !is_valid_target_frequency(input.target_frequency) {
        errors.push(format!(
            "target frequency {} must be greater than 0 and at most {} per year",
            input.target_frequency, MAX_TARGET_FREQUENCY
        ));
    }

    if input.target_frequency >= input.initiating_event_frequency {
        errors.push(format!(
            "target frequency {} must be less than the initiating event frequency {}; no protection is required",
            input.target_frequency, input.initiating_event_frequency
        ));
    }

    for (i, ipl) in input.ipls.iter().enumerate() {
        if !is_valid_pfd(ipl.pfd) {
            errors.push(prefix_ipl_error(i, ipl, &pfd_error(ipl.pfd)));
        }
    }

    ValidationResult::from_errors(errors)
}
