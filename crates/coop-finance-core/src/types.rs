use rust_decimal::Decimal;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Interest and retention rates, expressed as monthly percentages the way the
/// cooperative quotes them (1 = 1% per month). Never as decimals.
pub type Rate = Decimal;
