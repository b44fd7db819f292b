//! Late-fee and interest accrual. Pure, stateless, deterministic: the
//! caller supplies `today` so results are reproducible.

use crate::config::settings::EngineSettings;
use chrono::NaiveDate;
use shared::models::{NormalizedRecord, Status};

/// Whole days past the due date, floored at zero. A paid installment is
/// never late, whatever the date math says.
pub fn days_late(due_date: NaiveDate, today: NaiveDate, status: Status) -> i64 {
    if status == Status::Paid {
        return 0;
    }
    (today - due_date).num_days().max(0)
}

/// Flat fee on the original amount ("multa").
pub fn late_fee(amount: f64, late_fee_percent: f64) -> f64 {
    amount * late_fee_percent / 100.0
}

/// Simple pro-rata-die interest: the monthly rate divided by a fixed
/// 30-day month, times the days late.
pub fn interest(amount: f64, days_late: i64, monthly_rate_percent: f64) -> f64 {
    if days_late <= 0 {
        return 0.0;
    }
    amount * (monthly_rate_percent / 100.0 / 30.0) * days_late as f64
}

pub fn total_due(amount: f64, fee: f64, interest: f64) -> f64 {
    amount + fee + interest
}

/// Recomputes every derived field of a record in place. This is the only
/// way derived fields change, so they can never drift from their inputs.
pub fn refresh(record: &mut NormalizedRecord, settings: &EngineSettings, today: NaiveDate) {
    let days = match record.due_date {
        Some(due) => days_late(due, today, record.status),
        None => 0,
    };
    record.days_late = days;
    record.late_fee = if days > 0 {
        late_fee(record.amount, settings.late_fee_percent)
    } else {
        0.0
    };
    record.interest = interest(record.amount, days, settings.monthly_interest_percent);
    record.total_due = total_due(record.amount, record.late_fee, record.interest);
}
