//! Display strings for frequencies, PFDs and RRFs
//!
//! These strings are consumed verbatim by worksheet displays; changing a
//! threshold or precision here changes what operators see.

/// Frequencies below this switch to scientific notation
const FREQUENCY_SCIENTIFIC_BELOW: f64 = 1.0;
/// PFDs below this switch to scientific notation
const PFD_SCIENTIFIC_BELOW: f64 = 0.1;
const RRF_THOUSANDS: f64 = 1_000.0;
const RRF_MILLIONS: f64 = 1_000_000.0;

/// `1.0e-4/yr` below 1 per year, `2.5/yr` otherwise
pub fn format_frequency(frequency: f64) -> String {
    if frequency < FREQUENCY_SCIENTIFIC_BELOW {
        format!("{:.1e}/yr", frequency)
    } else {
        format!("{:.1}/yr", frequency)
    }
}

/// `1.0e-2` below 0.1, `0.10` otherwise
pub fn format_pfd(pfd: f64) -> String {
    if pfd < PFD_SCIENTIFIC_BELOW {
        format!("{:.1e}", pfd)
    } else {
        format!("{:.2}", pfd)
    }
}

/// `999`, `1.0K`, `2.5M`
pub fn format_rrf(rrf: f64) -> String {
    if rrf >= RRF_MILLIONS {
        format!("{:.1}M", rrf / RRF_MILLIONS)
    } else if rrf >= RRF_THOUSANDS {
        format!("{:.1}K", rrf / RRF_THOUSANDS)
    } else {
        format!("{:.0}", rrf)
    }
}

pub fn format_orders_of_magnitude(orders: f64) -> String {
    format!("{:.1} orders", orders)
}
