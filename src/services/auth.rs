use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::{ApiClient, ApiError};
use crate::universal::models::User;
use crate::universal::processors::process_user;

#[derive(Debug, Clone, Deserialize)]
struct LoginResponse {
    token: String,
    user: Value,
}

/// Sign-up form as collected from the user.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Collected but not sent; the backend does not accept it at sign-up.
    pub phone: Option<String>,
    /// Referral code of the sponsoring user, if any.
    pub referred_by: Option<String>,
}

impl SignupRequest {
    /// Registration payload: `phone` dropped, `referredBy` sent as `referralCode`.
    pub fn payload(&self) -> Value {
        json!({
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "password": self.password,
            "referralCode": self.referred_by.clone().unwrap_or_default(),
        })
    }
}

/// Login, logout and account-level calls.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Authenticate and remember the bearer token for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = json!({ "email": email, "password": password });
        let resp: LoginResponse = self.api.post("/api/auth/login", &body, true).await?;
        self.api.session().set(&resp.token)?;
        let user = process_user(&resp.user);
        log::info!("Logged in as {} ({:?})", user.email, user.role);
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.api.session().clear()?;
        log::info!("Logged out");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.api.session().get().is_some()
    }

    pub async fn register(&self, signup: &SignupRequest) -> Result<(), ApiError> {
        let _: Value = self
            .api
            .post("/api/users/register", &signup.payload(), true)
            .await?;
        Ok(())
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        let _: Value = self
            .api
            .post("/api/auth/resend-verification", &json!({ "email": email }), false)
            .await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let v: Value = self.api.get("/api/users/me", false).await?;
        Ok(process_user(&v))
    }

    /// Update name and phone. The email is not editable and is never sent.
    pub async fn update_profile(
        &self,
        current: &User,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> Result<User, ApiError> {
        let payload = json!({ "firstName": first_name, "lastName": last_name, "phone": phone });
        let updated: Value = self.api.put("/api/users/me", Some(&payload)).await?;

        // The response may be partial, so it is layered over what we had.
        let mut merged = current_as_api(current);
        if let (Some(base), Some(patch)) = (merged.as_object_mut(), updated.as_object()) {
            for (k, v) in patch {
                base.insert(k.clone(), v.clone());
            }
        }
        Ok(process_user(&merged))
    }
}

/// Re-express a processed user in backend field names.
fn current_as_api(user: &User) -> Value {
    json!({
        "_id": user.id,
        "firstName": user.first_name,
        "lastName": user.last_name,
        "email": user.email,
        "phone": user.phone,
        "role": user.role,
        "isActive": user.status == crate::universal::models::AccountStatus::Active,
        "referralCode": user.referral_code,
        "referralLink": user.referral_link,
        "referredBy": user.referred_by,
        "balance": user.wallet_balance,
        "totalInvested": user.total_invested,
        "teamSize": user.team_size,
        "teamInvested": user.team_invested,
        "totalWithdrawal": user.total_withdrawal,
        "mxgnTokens": user.mxgn_tokens,
        "dailyProfit": user.daily_profit,
        "totalProfit": user.total_profit,
        "profitHistory": user.profit_history,
        "createdAt": user.join_date,
    })
}
