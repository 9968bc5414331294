use std::fmt;

/// Client-side reasons a withdrawal cannot be submitted.
///
/// Variants are listed in the order they are checked; the first failure wins.
#[derive(Debug, Clone, PartialEq)]
pub enum WithdrawalRejection {
    /// The fee schedule has not been fetched yet.
    ConfigNotReady,
    InvalidAmount,
    BelowMinimum { minimum: f64 },
    ExceedsAvailableBalance,
    MissingWalletName,
    MissingNetwork,
    MissingWalletAddress,
}

impl fmt::Display for WithdrawalRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawalRejection::ConfigNotReady => write!(f, "Loading fee details..."),
            WithdrawalRejection::InvalidAmount => write!(f, "Please enter a valid amount."),
            WithdrawalRejection::BelowMinimum { minimum } => {
                write!(f, "Minimum withdrawal amount is ${}.", plain_number(*minimum))
            }
            WithdrawalRejection::ExceedsAvailableBalance => {
                write!(f, "Withdrawal amount cannot exceed your available balance.")
            }
            WithdrawalRejection::MissingWalletName => write!(f, "Please enter a wallet name."),
            WithdrawalRejection::MissingNetwork => write!(f, "Please enter the network."),
            WithdrawalRejection::MissingWalletAddress => {
                write!(f, "Please enter a valid wallet address.")
            }
        }
    }
}

impl std::error::Error for WithdrawalRejection {}

/// `35.0` -> "35", `35.5` -> "35.5".
fn plain_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}
