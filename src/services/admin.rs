use serde_json::{json, Value};

use crate::common::{ApiClient, ApiError};
use crate::universal::models::{
    DepositRequest, Notification, Page, RequestStatus, User, WithdrawalRequest,
};
use crate::universal::processors::{
    process_deposit_request, process_notification, process_user, process_withdrawal_request,
};

use super::{list_items, page_count, query_string};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Active,
    Inactive,
    Blocked,
}

impl UserFilter {
    fn query_value(&self) -> &'static str {
        match self {
            UserFilter::All => "",
            UserFilter::Active => "active",
            UserFilter::Inactive => "inactive",
            UserFilter::Blocked => "blocked",
        }
    }
}

/// Filters for the deposit/withdrawal request lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestQuery {
    pub page: u32,
    /// `None` lists every status.
    pub status: Option<RequestStatus>,
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

/// Calls made from the admin console.
#[derive(Clone)]
pub struct AdminService {
    api: ApiClient,
    page_size: u32,
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        let page_size = api.config().admin_page_size.max(1);
        Self { api, page_size }
    }

    fn request_query(&self, q: &RequestQuery) -> String {
        query_string(&[
            ("page", q.page.max(1).to_string()),
            ("limit", self.page_size.to_string()),
            (
                "status",
                q.status.as_ref().map(RequestStatus::query_value).unwrap_or_default(),
            ),
            ("startDate", q.start_date.clone().unwrap_or_default()),
            ("endDate", q.end_date.clone().unwrap_or_default()),
        ])
    }

    pub async fn users(&self, page: u32, filter: UserFilter, search: &str) -> Result<Page<User>, ApiError> {
        let q = query_string(&[
            ("page", page.max(1).to_string()),
            ("limit", self.page_size.to_string()),
            ("search", search.trim().to_string()),
            ("status", filter.query_value().to_string()),
        ]);
        let v: Value = self.api.get(&format!("/api/admin/users{}", q), false).await?;
        Ok(Page {
            results: list_items(&v).iter().map(process_user).collect(),
            pages: page_count(&v, &["pages"]),
        })
    }

    pub async fn set_user_blocked(&self, user_id: &str, blocked: bool) -> Result<(), ApiError> {
        let _: Value = if blocked {
            self.api
                .put(
                    &format!("/api/admin/users/{}/block", user_id),
                    Some(&json!({ "isActive": false })),
                )
                .await?
        } else {
            self.api
                .put::<Value, Value>(&format!("/api/admin/users/{}/unblock", user_id), None)
                .await?
        };
        log::info!("User {} blocked={}", user_id, blocked);
        Ok(())
    }

    pub async fn deposits(&self, q: &RequestQuery) -> Result<Page<DepositRequest>, ApiError> {
        let v: Value = self
            .api
            .get(&format!("/api/admin/deposits{}", self.request_query(q)), false)
            .await?;
        let base = self.api.base_url();
        Ok(Page {
            results: list_items(&v)
                .iter()
                .map(|d| process_deposit_request(d, base))
                .collect(),
            pages: page_count(&v, &["pages"]),
        })
    }

    pub async fn withdrawals(&self, q: &RequestQuery) -> Result<Page<WithdrawalRequest>, ApiError> {
        let v: Value = self
            .api
            .get(&format!("/api/admin/withdrawals{}", self.request_query(q)), false)
            .await?;
        Ok(Page {
            results: list_items(&v).iter().map(process_withdrawal_request).collect(),
            pages: page_count(&v, &["pages"]),
        })
    }

    pub async fn decide_deposit(&self, id: &str, decision: Decision, reason: Option<&str>) -> Result<(), ApiError> {
        self.decide("deposits", id, decision, reason).await
    }

    pub async fn decide_withdrawal(&self, id: &str, decision: Decision, reason: Option<&str>) -> Result<(), ApiError> {
        self.decide("withdrawals", id, decision, reason).await
    }

    async fn decide(&self, kind: &str, id: &str, decision: Decision, reason: Option<&str>) -> Result<(), ApiError> {
        let _: Value = match decision {
            Decision::Approve => {
                self.api
                    .put::<Value, Value>(
                        &format!("/api/admin/transactions/{}/{}/approve", kind, id),
                        None,
                    )
                    .await?
            }
            Decision::Decline => {
                self.api
                    .put(
                        &format!("/api/admin/transactions/{}/{}/decline", kind, id),
                        Some(&json!({ "reason": reason })),
                    )
                    .await?
            }
        };
        log::info!("{} {} -> {:?}", kind, id, decision);
        Ok(())
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let v: Value = self.api.get("/api/admin/notifications", false).await?;
        Ok(list_items(&v).iter().map(process_notification).collect())
    }

    /// Targeted when `user_id` is set, global otherwise.
    pub async fn create_notification(
        &self,
        title: &str,
        content: &str,
        user_id: Option<&str>,
    ) -> Result<Notification, ApiError> {
        let v: Value = match user_id {
            Some(uid) => {
                self.api
                    .post(
                        "/api/notifications/admin/user",
                        &json!({ "title": title, "message": content, "userId": uid }),
                        false,
                    )
                    .await?
            }
            None => {
                self.api
                    .post(
                        "/api/notifications/admin/global",
                        &json!({ "title": title, "message": content }),
                        false,
                    )
                    .await?
            }
        };
        Ok(process_notification(&v))
    }

    pub async fn update_notification(&self, id: &str, title: &str, content: &str) -> Result<(), ApiError> {
        let _: Value = self
            .api
            .put(
                &format!("/api/admin/notifications/{}", id),
                Some(&json!({ "title": title, "message": content })),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_notification(&self, id: &str) -> Result<(), ApiError> {
        let _: Value = self
            .api
            .delete(&format!("/api/admin/notifications/{}", id))
            .await?;
        Ok(())
    }

    pub async fn withdrawal_limit(&self) -> Result<f64, ApiError> {
        let v: Value = self
            .api
            .get("/api/admin/settings/withdrawal-limit", false)
            .await?;
        v.get("limit")
            .and_then(Value::as_f64)
            .ok_or_else(|| ApiError::Decode("missing `limit` in withdrawal-limit response".to_string()))
    }

    /// The limit must be a non-negative number.
    pub async fn set_withdrawal_limit(&self, limit: f64) -> Result<(), ApiError> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(crate::common::Rejection::new("Please enter a valid, non-negative limit.").into());
        }
        let _: Value = self
            .api
            .put(
                "/api/admin/settings/withdrawal-limit",
                Some(&json!({ "limit": limit })),
            )
            .await?;
        Ok(())
    }
}
