//! LOPA core library - Layers of Protection Analysis for HazOp studies

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Every calculation is a pure function of its inputs
// - No global mutable state
// - No randomness, clocks, threads, or async
// - IEEE-754 f64 throughout
// - Validation aggregates; arithmetic fails fast and never returns partial results
// - Identical input yields byte-for-byte identical output

pub mod analysis;
pub mod config;
pub mod error;
pub mod format;
pub mod ipl;
pub mod lopa;
pub mod report;
pub mod rrf;
pub mod sil;
pub mod standards;
pub mod trigger;
pub mod validation;

pub use analysis::{
    analyze_risk_reduction, analyze_risk_reduction_gap, calculate_rrf_requirement,
    estimate_ipl_count, GapAnalysis, RiskReductionAnalysis, RrfRequirement,
};
pub use config::ResolvedConfig;
pub use error::LopaError;
pub use ipl::{Ipl, IplType, LopaInput};
pub use lopa::{perform_lopa_calculation, LopaResult};
pub use report::{render_json, render_text};
pub use rrf::{GapStatus, GapThresholds};
pub use sil::SilLevel;
pub use standards::StandardsCatalog;
pub use validation::ValidationResult;
