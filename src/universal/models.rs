use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Role {
        if raw.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Blocked,
}

/// Lifecycle of a deposit or withdrawal request as reported by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Declined,
    /// Anything the backend reports that we do not model yet.
    Other(String),
}

impl RequestStatus {
    /// Case-insensitive; a missing status is treated as pending.
    pub fn parse(raw: Option<&str>) -> RequestStatus {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            None => RequestStatus::Pending,
            Some(s) => match s.as_str() {
                "" | "pending" => RequestStatus::Pending,
                "approved" => RequestStatus::Approved,
                "declined" | "rejected" => RequestStatus::Declined,
                _ => RequestStatus::Other(s),
            },
        }
    }

    /// Capitalised form used in admin list query strings ("Pending").
    pub fn query_value(&self) -> String {
        let raw = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Declined => "declined",
            RequestStatus::Other(s) => s.as_str(),
        };
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfitHistoryItem {
    pub amount: f64,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub status: AccountStatus,
    pub referral_code: String,
    pub referral_link: Option<String>,
    pub referred_by: Option<String>,
    pub wallet_balance: f64,
    pub total_invested: f64,
    pub team_size: u64,
    pub team_invested: f64,
    pub total_withdrawal: f64,
    pub mxgn_tokens: f64,
    pub daily_profit: f64,
    pub total_profit: f64,
    pub profit_history: Vec<ProfitHistoryItem>,
    /// Joined as `YYYY-MM-DD`.
    pub join_date: String,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DepositRequest {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub amount: f64,
    pub transaction_id: String,
    /// Absolute URL of the uploaded screenshot, empty if none.
    pub screenshot: String,
    pub status: RequestStatus,
    pub date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WithdrawalRequest {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub user_wallet_balance: Option<f64>,
    pub amount: f64,
    /// Amount paid out after fees.
    pub received_amount: f64,
    pub wallet_name: String,
    pub wallet_address: String,
    pub network: String,
    pub status: RequestStatus,
    pub date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReferredUser {
    pub id: String,
    pub name: String,
    pub join_date: String,
    /// "Active" once the referral has a balance, "Pending" otherwise.
    pub status: String,
    pub balance: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    /// `None` for global notifications.
    pub user_id: Option<String>,
    pub title: String,
    pub content: String,
    pub date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyClaim {
    pub eligible: bool,
    pub amount: f64,
    pub next_claim_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReward {
    pub month: String,
    pub total_investment: f64,
    pub team_investment: f64,
    pub achieved_tier: String,
    pub reward_amount: f64,
    pub is_claimed: bool,
    pub progress_sum: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DashboardData {
    pub user: User,
    pub notifications: Vec<Notification>,
    pub daily_claim: DailyClaim,
    pub monthly_reward: MonthlyReward,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub join_date: String,
    pub status: String,
    pub investment: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TeamLevel {
    pub level: String,
    pub members: Vec<TeamMember>,
    /// Remaining per-level fields (commission rate, totals, ...) as sent.
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TeamLevels {
    pub levels: Vec<TeamLevel>,
    pub applied_tier: Option<u32>,
}

/// One page of a paginated admin or team listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub pages: u32,
}
