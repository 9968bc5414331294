use crate::universal::models::{RequestStatus, WithdrawalRequest};

use super::{FeeTier, QuoteState, WithdrawalConfig, WithdrawalQuote};

/// Parse user input into a withdrawal amount.
///
/// Returns `None` for empty, non-numeric, non-finite, zero or negative input.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Balance left after subtracting requests still awaiting approval. Never negative.
#[inline]
pub fn available_balance(wallet_balance: f64, pending_total: f64) -> f64 {
    (wallet_balance - pending_total).max(0.0)
}

/// Sum of amounts of every request still in `Pending`.
pub fn pending_withdrawals_total(requests: &[WithdrawalRequest]) -> f64 {
    requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .map(|r| r.amount)
        .sum()
}

/// Tier for an amount already known to be within `0 < amount <= available`.
///
/// Strictly greater than the threshold selects the high tier, so an amount
/// exactly at the threshold stays standard.
pub fn fee_tier(amount: f64, available: f64, cfg: &WithdrawalConfig) -> FeeTier {
    if amount > available * cfg.high_balance_threshold {
        FeeTier::HighBalance
    } else {
        FeeTier::Standard
    }
}

/// Compute the live quote for the current input.
///
/// Full precision is kept here; round only when formatting for display.
pub fn quote(
    amount_raw: &str,
    wallet_balance: f64,
    pending_total: f64,
    cfg: &WithdrawalConfig,
) -> WithdrawalQuote {
    let available = available_balance(wallet_balance, pending_total);

    let amount = match parse_amount(amount_raw) {
        Some(a) => a,
        None => {
            return WithdrawalQuote {
                requested_amount: 0.0,
                available_balance: available,
                fee_tier: FeeTier::Standard,
                fee_percentage: cfg.standard_fee_percentage,
                fee: 0.0,
                net_payout: 0.0,
                remaining_balance: available,
                state: QuoteState::Inert,
            }
        }
    };

    if amount > available {
        // Preview of the raw request; submission is rejected elsewhere.
        return WithdrawalQuote {
            requested_amount: amount,
            available_balance: available,
            fee_tier: FeeTier::Standard,
            fee_percentage: cfg.standard_fee_percentage,
            fee: 0.0,
            net_payout: amount,
            remaining_balance: 0.0,
            state: QuoteState::OverLimit,
        };
    }

    let tier = fee_tier(amount, available, cfg);
    let fee_percentage = cfg.percentage_for(tier);
    let fee = amount * fee_percentage / 100.0;

    WithdrawalQuote {
        requested_amount: amount,
        available_balance: available,
        fee_tier: tier,
        fee_percentage,
        fee,
        net_payout: (amount - fee).max(0.0),
        remaining_balance: (available - amount).max(0.0),
        state: QuoteState::Valid,
    }
}

/// Explanation of both fee tiers for display next to the amount field.
pub fn fee_tooltip(cfg: Option<&WithdrawalConfig>) -> String {
    match cfg {
        Some(cfg) => format!(
            "A {}% fee is applied for international transactions. Withdrawals over {}% of your balance incur a {}% fee.",
            cfg.standard_fee_percentage,
            cfg.high_balance_threshold * 100.0,
            cfg.high_balance_fee_percentage
        ),
        None => "Loading fee details...".to_string(),
    }
}

/// Two-decimal US-style money formatting with thousands separators.
pub fn format_usd(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
    }

    #[test]
    fn format_usd_groups_thousands() {
        assert_eq!(format_usd(0.0), "0.00");
        assert_eq!(format_usd(999.999), "1,000.00");
        assert_eq!(format_usd(1234567.891), "1,234,567.89");
        assert_eq!(format_usd(-42.5), "-42.50");
    }

    #[test]
    fn tooltip_mentions_both_tiers() {
        let cfg = WithdrawalConfig::fallback();
        let text = fee_tooltip(Some(&cfg));
        assert!(text.contains("A 6% fee"));
        assert!(text.contains("over 80% of your balance"));
        assert!(text.contains("a 20% fee"));
        assert_eq!(fee_tooltip(None), "Loading fee details...");
    }
}
