//! Fixed-payment annuity (PMT), the dashboard's quick loan simulator.

/// Payment per period for a loan of `present_value` over `num_periods` at
/// `periodic_rate` (e.g. 0.01 for 1% per period).
///
/// Returned as a negative cash flow, the spreadsheet-PMT convention;
/// callers negate for display. The zero-rate case avoids the exponential
/// form entirely.
pub fn payment(periodic_rate: f64, num_periods: u32, present_value: f64) -> f64 {
    if num_periods == 0 {
        return 0.0;
    }
    if periodic_rate == 0.0 {
        return -present_value / num_periods as f64;
    }
    -(present_value * periodic_rate) / (1.0 - (1.0 + periodic_rate).powi(-(num_periods as i32)))
}
