use serde::{Deserialize, Serialize};

/// Fee schedule published by the backend.
///
/// Percentages are whole-number percents (`6.0` = 6%); the threshold is a
/// fraction of the available balance (`0.8` = 80%).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalConfig {
    pub standard_fee_percentage: f64,
    pub high_balance_fee_percentage: f64,
    pub high_balance_threshold: f64,
    pub minimum_withdrawal: f64,
    /// Informational only; the calculator does not enforce it.
    #[serde(default)]
    pub daily_withdrawal_limit: f64,
}

impl WithdrawalConfig {
    /// Used when the config endpoint cannot be reached.
    pub const fn fallback() -> Self {
        Self {
            standard_fee_percentage: 6.0,
            high_balance_fee_percentage: 20.0,
            high_balance_threshold: 0.8,
            minimum_withdrawal: 35.0,
            daily_withdrawal_limit: 500.0,
        }
    }

    /// Every field must be finite and non-negative before the calculator runs.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("standardFeePercentage", self.standard_fee_percentage),
            ("highBalanceFeePercentage", self.high_balance_fee_percentage),
            ("highBalanceThreshold", self.high_balance_threshold),
            ("minimumWithdrawal", self.minimum_withdrawal),
            ("dailyWithdrawalLimit", self.daily_withdrawal_limit),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        Ok(())
    }

    pub fn percentage_for(&self, tier: FeeTier) -> f64 {
        match tier {
            FeeTier::Standard => self.standard_fee_percentage,
            FeeTier::HighBalance => self.high_balance_fee_percentage,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum FeeTier {
    Standard,
    /// The request takes more than `high_balance_threshold` of the available balance.
    HighBalance,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuoteState {
    /// Empty, non-numeric, zero or negative input.
    Inert,
    /// Amount above the available balance: preview only, never submittable.
    OverLimit,
    Valid,
}

/// Live preview of a withdrawal, recomputed on every input change.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct WithdrawalQuote {
    pub requested_amount: f64,
    pub available_balance: f64,
    pub fee_tier: FeeTier,
    pub fee_percentage: f64,
    pub fee: f64,
    pub net_payout: f64,
    pub remaining_balance: f64,
    pub state: QuoteState,
}

impl WithdrawalQuote {
    /// Positive and no larger than the available balance. The minimum and
    /// the wallet fields are checked by `WithdrawalForm::verdict`, which is
    /// what decides whether a request may be sent.
    #[inline]
    pub fn within_balance(&self) -> bool {
        self.state == QuoteState::Valid
    }
}

/// A request that passed every client-side check and may be sent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedWithdrawal {
    pub amount: f64,
    pub wallet_address: String,
    pub wallet_name: String,
    pub network: String,
}

/// Whether the form may be submitted right now, and why not.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitVerdict {
    pub allowed: bool,
    pub reason: Option<String>,
}
