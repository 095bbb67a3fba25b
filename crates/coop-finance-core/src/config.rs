use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Operating parameters of the cooperative, fixed by the assembly and applied
/// uniformly to every member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoopConfig {
    /// Monthly capital contribution per member.
    pub monthly_share_amount: Money,
    /// Monthly administrative expense collected with the share.
    pub monthly_expense_amount: Money,
    /// Flat penalty for late contributions.
    pub penalty_amount: Money,
    /// Day of the month after which a contribution counts as late.
    pub penalty_day_threshold: u32,
    /// Loan interest rate, percent per month.
    pub monthly_interest_rate: Rate,
    pub currency_symbol: String,
    pub currency_code: String,
    /// Flat bank transfer fee charged alongside every loan payment.
    pub transfer_fee: Money,
    /// Retention withheld at disbursement, percent of principal.
    pub retention_rate: Rate,
    /// Cash carried forward from the previous accounting year.
    pub opening_balance: Money,
}

impl Default for CoopConfig {
    fn default() -> Self {
        Self {
            monthly_share_amount: dec!(25),
            monthly_expense_amount: dec!(5),
            penalty_amount: dec!(5),
            penalty_day_threshold: 3,
            monthly_interest_rate: dec!(1),
            currency_symbol: "$".to_string(),
            currency_code: "USD".to_string(),
            transfer_fee: dec!(0.41),
            retention_rate: dec!(1),
            opening_balance: dec!(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_json() {
        let config = CoopConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: CoopConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: CoopConfig = serde_json::from_str(r#"{"transferFee":"0.50"}"#).unwrap();
        assert_eq!(config.transfer_fee, dec!(0.50));
        assert_eq!(config.monthly_share_amount, dec!(25));
    }
}
