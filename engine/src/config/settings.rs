// Engine settings, adjustable by the caller (the dashboard exposes the two
// rates as sidebar inputs).
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    /// Flat late fee, percent of the original amount ("multa").
    pub late_fee_percent: f64,
    /// Simple monthly interest, percent ("juros de mora").
    pub monthly_interest_percent: f64,
    /// Prefer dd/mm over mm/dd when a date is ambiguous. Defaults to the
    /// Brazilian convention; ambiguous inputs like 01/02/2026 follow this
    /// flag, so it must stay configurable.
    pub day_first: bool,
    /// When true, rows whose due date cannot be parsed are dropped (with a
    /// warning). When false they are kept with no due date and zero accrual.
    pub drop_unparseable_dates: bool,
    /// Timeout for Banco Central SGS requests, seconds.
    pub bcb_timeout_secs: u64,
    /// How long a fetched index series stays cached, seconds.
    pub bcb_cache_ttl_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            late_fee_percent: 10.0,
            monthly_interest_percent: 1.0,
            day_first: true,
            drop_unparseable_dates: true,
            bcb_timeout_secs: 10,
            bcb_cache_ttl_secs: 3600,
        }
    }
}
