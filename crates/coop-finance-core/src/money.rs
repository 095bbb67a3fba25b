use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::Money;

/// Tolerance for "fully paid" comparisons. Anything within one cent of zero
/// is treated as settled.
pub const APPROX_ZERO: Decimal = dec!(0.01);

/// Round to two decimal places, half away from zero.
pub fn round_cents(x: Decimal) -> Money {
    x.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round up to the next cent. The fixed monthly payment is the only value in
/// the system rounded this way; everything else goes through [`round_cents`].
pub fn round_cents_up(x: Decimal) -> Money {
    x.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity)
}

pub fn is_approximately_zero(x: Decimal) -> bool {
    x.abs() <= APPROX_ZERO
}

/// Calendar month addition with end-of-month clamping (Jan 31 + 1 month is
/// Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}
