// Financial calculators: pure functions, no state.
pub mod accrual;
pub mod annuity;
