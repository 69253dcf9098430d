//! Safety Integrity Level bands
//!
//! Global invariants enforced:
//! - Band tables are ordered and non-overlapping
//! - PFD bands are `[low, high)`, RRF bands are the reciprocal `(1/high, 1/low]`
//! - Lookups outside every band return `None`, never the nearest SIL

use serde::{Deserialize, Serialize};
use std::fmt;

/// Safety Integrity Level (IEC 61511, low-demand mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SilLevel {
    Sil1,
    Sil2,
    Sil3,
    Sil4,
}

impl SilLevel {
    pub const ALL: [SilLevel; 4] = [
        SilLevel::Sil1,
        SilLevel::Sil2,
        SilLevel::Sil3,
        SilLevel::Sil4,
    ];

    pub fn as_u8(&self) -> u8 {
        match self {
            SilLevel::Sil1 => 1,
            SilLevel::Sil2 => 2,
            SilLevel::Sil3 => 3,
            SilLevel::Sil4 => 4,
        }
    }

    /// Representative PFD inside the band, used for planning estimates
    pub fn typical_pfd(&self) -> f64 {
        match self {
            SilLevel::Sil1 => 5e-2,
            SilLevel::Sil2 => 5e-3,
            SilLevel::Sil3 => 5e-4,
            SilLevel::Sil4 => 5e-5,
        }
    }

    /// Representative RRF, the reciprocal of `typical_pfd`
    pub fn typical_rrf(&self) -> f64 {
        1.0 / self.typical_pfd()
    }
}

impl fmt::Display for SilLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIL {}", self.as_u8())
    }
}

impl From<SilLevel> for u8 {
    fn from(sil: SilLevel) -> u8 {
        sil.as_u8()
    }
}

impl TryFrom<u8> for SilLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SilLevel::Sil1),
            2 => Ok(SilLevel::Sil2),
            3 => Ok(SilLevel::Sil3),
            4 => Ok(SilLevel::Sil4),
            other => Err(format!("SIL must be between 1 and 4 (got {})", other)),
        }
    }
}

/// One row of the SIL table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilBand {
    pub sil: SilLevel,
    /// Inclusive lower PFD bound
    pub pfd_low: f64,
    /// Exclusive upper PFD bound
    pub pfd_high: f64,
}

impl SilBand {
    pub fn contains_pfd(&self, pfd: f64) -> bool {
        pfd >= self.pfd_low && pfd < self.pfd_high
    }

    /// Exclusive lower RRF bound
    pub fn rrf_low(&self) -> f64 {
        1.0 / self.pfd_high
    }

    /// Inclusive upper RRF bound
    pub fn rrf_high(&self) -> f64 {
        1.0 / self.pfd_low
    }

    pub fn contains_rrf(&self, rrf: f64) -> bool {
        rrf > self.rrf_low() && rrf <= self.rrf_high()
    }
}

/// SIL table ordered from SIL 1 to SIL 4
pub const SIL_BANDS: [SilBand; 4] = [
    SilBand {
        sil: SilLevel::Sil1,
        pfd_low: 1e-2,
        pfd_high: 1e-1,
    },
    SilBand {
        sil: SilLevel::Sil2,
        pfd_low: 1e-3,
        pfd_high: 1e-2,
    },
    SilBand {
        sil: SilLevel::Sil3,
        pfd_low: 1e-4,
        pfd_high: 1e-3,
    },
    SilBand {
        sil: SilLevel::Sil4,
        pfd_low: 1e-5,
        pfd_high: 1e-4,
    },
];

/// Required-SIL recommendation bands keyed by additional RRF needed
///
/// Each entry is an inclusive upper bound; anything above the last bound is SIL 4.
pub const REQUIRED_SIL_BANDS: [(f64, SilLevel); 3] = [
    (10.0, SilLevel::Sil1),
    (100.0, SilLevel::Sil2),
    (1000.0, SilLevel::Sil3),
];

/// Look up the SIL whose PFD band contains `pfd`
pub fn determine_sil_from_pfd(pfd: f64) -> Option<SilLevel> {
    SIL_BANDS
        .iter()
        .find(|band| band.contains_pfd(pfd))
        .map(|band| band.sil)
}

/// Look up the SIL whose RRF band contains `rrf`
pub fn determine_sil_from_rrf(rrf: f64) -> Option<SilLevel> {
    SIL_BANDS
        .iter()
        .find(|band| band.contains_rrf(rrf))
        .map(|band| band.sil)
}

/// Map an additional RRF requirement onto the recommendation bands
pub fn sil_for_additional_rrf(additional_rrf: f64) -> SilLevel {
    REQUIRED_SIL_BANDS
        .iter()
        .find(|(upper, _)| additional_rrf <= *upper)
        .map(|(_, sil)| *sil)
        .unwrap_or(SilLevel::Sil4)
}
