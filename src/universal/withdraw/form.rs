use futures::future::BoxFuture;

use crate::common::ApiError;

use super::calculator::{available_balance, parse_amount, quote};
use super::{
    SubmitVerdict, ValidatedWithdrawal, WithdrawalConfig, WithdrawalQuote, WithdrawalRejection,
};

/// Backend operation that records a withdrawal request.
pub trait WithdrawalGateway: Send + Sync {
    fn submit_withdrawal_request<'a>(
        &'a self,
        request: &'a ValidatedWithdrawal,
    ) -> BoxFuture<'a, Result<(), ApiError>>;
}

/// State behind the withdrawal page: raw inputs, balances and the fetched
/// fee schedule. `config` stays `None` until the schedule (or its fallback)
/// has been installed, and nothing can be submitted before that.
#[derive(Clone, Debug, Default)]
pub struct WithdrawalForm {
    pub amount: String,
    pub wallet_name: String,
    pub network: String,
    pub wallet_address: String,
    pub wallet_balance: f64,
    pub pending_total: f64,
    config: Option<WithdrawalConfig>,
    /// Inline error shown under the form.
    pub error: Option<String>,
    /// Inline confirmation after a successful submit.
    pub success: Option<String>,
    submitting: bool,
}

impl WithdrawalForm {
    pub fn new(wallet_balance: f64, pending_total: f64) -> Self {
        Self {
            wallet_balance,
            pending_total,
            ..Self::default()
        }
    }

    /// Install a fetched fee schedule. An invalid schedule is refused and the
    /// form stays not-ready.
    pub fn set_config(&mut self, cfg: WithdrawalConfig) -> Result<(), String> {
        cfg.validate()?;
        self.config = Some(cfg);
        Ok(())
    }

    pub fn config(&self) -> Option<&WithdrawalConfig> {
        self.config.as_ref()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.config.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn available_balance(&self) -> f64 {
        available_balance(self.wallet_balance, self.pending_total)
    }

    /// Live quote, or `None` while the fee schedule is not loaded.
    pub fn quote(&self) -> Option<WithdrawalQuote> {
        self.config
            .as_ref()
            .map(|cfg| quote(&self.amount, self.wallet_balance, self.pending_total, cfg))
    }

    /// Client-side checks in display order; the first failure wins.
    pub fn validate(&self) -> Result<ValidatedWithdrawal, WithdrawalRejection> {
        let cfg = self.config.as_ref().ok_or(WithdrawalRejection::ConfigNotReady)?;

        let amount = parse_amount(&self.amount).ok_or(WithdrawalRejection::InvalidAmount)?;
        if amount < cfg.minimum_withdrawal {
            return Err(WithdrawalRejection::BelowMinimum {
                minimum: cfg.minimum_withdrawal,
            });
        }
        if amount > self.available_balance() {
            return Err(WithdrawalRejection::ExceedsAvailableBalance);
        }

        let wallet_name = self.wallet_name.trim();
        if wallet_name.is_empty() {
            return Err(WithdrawalRejection::MissingWalletName);
        }
        let network = self.network.trim();
        if network.is_empty() {
            return Err(WithdrawalRejection::MissingNetwork);
        }
        let wallet_address = self.wallet_address.trim();
        if wallet_address.is_empty() {
            return Err(WithdrawalRejection::MissingWalletAddress);
        }

        Ok(ValidatedWithdrawal {
            amount,
            wallet_address: wallet_address.to_string(),
            wallet_name: wallet_name.to_string(),
            network: network.to_string(),
        })
    }

    pub fn verdict(&self) -> SubmitVerdict {
        if self.submitting {
            return SubmitVerdict {
                allowed: false,
                reason: Some("A request is already being submitted.".to_string()),
            };
        }
        match self.validate() {
            Ok(_) => SubmitVerdict {
                allowed: true,
                reason: None,
            },
            Err(rejection) => SubmitVerdict {
                allowed: false,
                reason: Some(rejection.to_string()),
            },
        }
    }

    /// Validate, then hand the request to the backend.
    ///
    /// Validation failures never reach the network. Server rejections are
    /// kept as the inline error and the inputs stay populated for a retry;
    /// on success every input is reset for the next request.
    pub async fn submit<G: WithdrawalGateway + ?Sized>(&mut self, gateway: &G) -> bool {
        self.success = None;
        let request = match self.validate() {
            Ok(req) => req,
            Err(rejection) => {
                self.error = Some(rejection.to_string());
                return false;
            }
        };
        self.error = None;
        self.submitting = true;

        log::info!(
            "Submitting withdrawal of {} to {} ({})",
            request.amount,
            request.wallet_name,
            request.network
        );
        let outcome = gateway.submit_withdrawal_request(&request).await;
        self.submitting = false;

        match outcome {
            Ok(()) => {
                self.amount.clear();
                self.wallet_name.clear();
                self.wallet_address.clear();
                self.network.clear();
                self.success = Some(
                    "Withdrawal request submitted successfully! It will be reviewed shortly."
                        .to_string(),
                );
                true
            }
            Err(err) => {
                log::warn!("Withdrawal request rejected: {}", err);
                let message = err.message();
                self.error = Some(if message.trim().is_empty() {
                    "Failed to submit request. Please try again.".to_string()
                } else {
                    message
                });
                false
            }
        }
    }
}
