use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{json, Value};

use crate::common::{ApiClient, ApiError};
use crate::universal::models::{
    DashboardData, DepositRequest, Page, ReferredUser, TeamLevels, WithdrawalRequest,
};
use crate::universal::processors::{
    process_dashboard_data, process_deposit_request, process_referred_user, process_team_levels,
    process_withdrawal_request,
};
use crate::universal::withdraw::{ValidatedWithdrawal, WithdrawalConfig, WithdrawalGateway};

use super::{list_items, page_count, query_string};

/// Wire body of a new withdrawal request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawalPayload<'a> {
    amount: f64,
    destination_address: &'a str,
    wallet_name: &'a str,
    network: &'a str,
}

/// A deposit proof ready for upload.
#[derive(Debug, Clone)]
pub struct DepositSubmission {
    pub amount: f64,
    pub transaction_id: String,
    pub screenshot_name: String,
    pub screenshot: Vec<u8>,
}

/// Calls made from the user shell.
#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn dashboard(&self) -> Result<DashboardData, ApiError> {
        let v: Value = self.api.get("/api/dashboard", false).await?;
        Ok(process_dashboard_data(&v))
    }

    /// Fee schedule, or the built-in fallback if it cannot be fetched or is
    /// malformed. Users are never blocked on this call.
    pub async fn fetch_withdrawal_config(&self) -> WithdrawalConfig {
        let fetched: Result<WithdrawalConfig, ApiError> = self
            .api
            .get("/api/system/public/withdrawal-config", true)
            .await;
        match fetched {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(reason) => {
                    log::warn!("Withdrawal config rejected ({}), using fallback", reason);
                    WithdrawalConfig::fallback()
                }
            },
            Err(err) => {
                log::warn!("Failed to fetch withdrawal config: {}, using fallback", err);
                WithdrawalConfig::fallback()
            }
        }
    }

    /// Own withdrawal history, newest first.
    pub async fn withdrawals(&self) -> Result<Vec<WithdrawalRequest>, ApiError> {
        let v: Value = self.api.get("/api/withdrawals", false).await?;
        let mut items: Vec<WithdrawalRequest> =
            list_items(&v).iter().map(process_withdrawal_request).collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    pub async fn submit_withdrawal(&self, request: &ValidatedWithdrawal) -> Result<(), ApiError> {
        let payload = WithdrawalPayload {
            amount: request.amount,
            destination_address: &request.wallet_address,
            wallet_name: &request.wallet_name,
            network: &request.network,
        };
        let _: Value = self.api.post("/api/withdrawals", &payload, false).await?;
        Ok(())
    }

    /// Own deposit history, newest first.
    pub async fn deposits(&self) -> Result<Vec<DepositRequest>, ApiError> {
        let v: Value = self.api.get("/api/deposits", false).await?;
        let base = self.api.base_url();
        let mut items: Vec<DepositRequest> = list_items(&v)
            .iter()
            .map(|d| process_deposit_request(d, base))
            .collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    pub async fn submit_deposit(&self, deposit: DepositSubmission) -> Result<(), ApiError> {
        let part = reqwest::multipart::Part::bytes(deposit.screenshot)
            .file_name(deposit.screenshot_name);
        let form = reqwest::multipart::Form::new()
            .text("amount", deposit.amount.to_string())
            .text("transactionId", deposit.transaction_id)
            .part("screenshot", part);
        let _: Value = self.api.post_form("/api/deposits", form).await?;
        Ok(())
    }

    /// Claim today's bonus. An "already claimed" answer comes back as an
    /// `ApiError` whose `next_claim_at()` is set.
    pub async fn claim_daily_bonus(&self) -> Result<(), ApiError> {
        let endpoint = self.api.config().claim_endpoint.clone();
        let _: Value = self.api.post(&endpoint, &json!({}), false).await?;
        Ok(())
    }

    pub async fn referred_users(&self, page: u32, limit: u32) -> Result<Page<ReferredUser>, ApiError> {
        let q = query_string(&[("page", page.to_string()), ("limit", limit.to_string())]);
        let v: Value = self.api.get(&format!("/api/team/referred{}", q), false).await?;
        let results = v
            .get("data")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(process_referred_user).collect())
            .unwrap_or_default();
        Ok(Page {
            results,
            pages: page_count(&v, &["pagination", "pages"]).max(1),
        })
    }

    pub async fn team_levels(&self, tier: Option<u32>, levels: Option<u32>) -> Result<TeamLevels, ApiError> {
        let q = query_string(&[
            ("tier", tier.map(|t| t.to_string()).unwrap_or_default()),
            ("levels", levels.map(|l| l.to_string()).unwrap_or_default()),
        ]);
        let v: Value = self.api.get(&format!("/api/team/levels{}", q), false).await?;
        Ok(process_team_levels(&v))
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), ApiError> {
        let _: Value = self
            .api
            .put(&format!("/api/notifications/{}/read", id), Some(&json!({})))
            .await?;
        Ok(())
    }
}

impl WithdrawalGateway for UserService {
    fn submit_withdrawal_request<'a>(
        &'a self,
        request: &'a ValidatedWithdrawal,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        self.submit_withdrawal(request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_payload_uses_backend_field_names() {
        let payload = WithdrawalPayload {
            amount: 120.5,
            destination_address: "TXabc",
            wallet_name: "Trust",
            network: "TRC20",
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "amount": 120.5,
                "destinationAddress": "TXabc",
                "walletName": "Trust",
                "network": "TRC20",
            })
        );
    }
}
