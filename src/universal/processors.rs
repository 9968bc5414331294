//! Normalization of backend payloads into the typed models.
//!
//! The backend is loose about field names (`_id` vs `id`, `ballence` vs
//! `balance`, ...) and about which fields are present at all. Every known
//! alias is checked here so the rest of the crate sees one shape.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::models::{
    AccountStatus, DailyClaim, DashboardData, DepositRequest, MonthlyReward, Notification,
    ProfitHistoryItem, ReferredUser, RequestStatus, Role, TeamLevel, TeamLevels, TeamMember, User,
    WithdrawalRequest,
};

/// First key holding a non-empty string (numbers are stringified).
fn text(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match v.get(*k) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// First key holding a number (numeric strings accepted). Zero counts as present.
fn number(v: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match v.get(*k) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn flag(v: &Value, key: &str) -> Option<bool> {
    v.get(key).and_then(Value::as_bool)
}

/// The nested `user` object, when the backend populated it.
fn populated<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.get(key).filter(|u| u.is_object())
}

/// Render a backend timestamp as `YYYY-MM-DD`; a missing timestamp means today.
pub fn format_date(raw: Option<&str>) -> String {
    match raw {
        None => Utc::now().format("%Y-%m-%d").to_string(),
        Some(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                dt.with_timezone(&Utc).format("%Y-%m-%d").to_string()
            } else if let Ok(d) = NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d") {
                d.format("%Y-%m-%d").to_string()
            } else {
                s.to_string()
            }
        }
    }
}

fn created_at(v: &Value) -> String {
    format_date(v.get("createdAt").and_then(Value::as_str))
}

fn status_of(v: &Value) -> RequestStatus {
    RequestStatus::parse(v.get("status").and_then(Value::as_str))
}

fn profit_item(p: &Value) -> ProfitHistoryItem {
    let date = match p.get("date").and_then(Value::as_str) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => created_at(p),
    };
    ProfitHistoryItem {
        amount: number(p, &["amount"]).unwrap_or(0.0),
        description: text(p, &["description"]).unwrap_or_default(),
        kind: text(p, &["type"]).unwrap_or_default(),
        date,
    }
}

pub fn process_user(v: &Value) -> User {
    let blocked = flag(v, "isActive") == Some(false)
        || matches!(
            v.get("status").and_then(Value::as_str),
            Some("inactive") | Some("blocked")
        );

    let email = text(v, &["email"]).unwrap_or_default();
    let referral_code = text(v, &["referralCode"]).unwrap_or_else(|| {
        email.split('@').next().unwrap_or_default().to_string()
    });

    User {
        id: text(v, &["_id", "id"]).unwrap_or_default(),
        first_name: text(v, &["firstName"]).unwrap_or_default(),
        last_name: text(v, &["lastName"]).unwrap_or_default(),
        phone: text(v, &["phone"]).unwrap_or_default(),
        role: text(v, &["role"]).map(|r| Role::parse(&r)).unwrap_or(Role::User),
        status: if blocked {
            AccountStatus::Blocked
        } else {
            AccountStatus::Active
        },
        referral_code,
        referral_link: text(v, &["referralLink"]),
        referred_by: text(v, &["referredBy"]),
        wallet_balance: number(v, &["ballence", "balance", "walletBalance"]).unwrap_or(0.0),
        total_invested: number(v, &["totalInvested"]).unwrap_or(0.0),
        team_size: number(v, &["teamCount", "teamSize"]).unwrap_or(0.0).max(0.0) as u64,
        team_invested: number(v, &["teamInvested"]).unwrap_or(0.0),
        total_withdrawal: number(v, &["totalWithdrawal"]).unwrap_or(0.0),
        mxgn_tokens: number(v, &["mxgnTokens"]).unwrap_or(0.0),
        daily_profit: number(v, &["dailyProfit"]).unwrap_or(0.0),
        total_profit: number(v, &["totalProfit"]).unwrap_or(0.0),
        profit_history: v
            .get("profitHistory")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(profit_item).collect())
            .unwrap_or_default(),
        join_date: created_at(v),
        email,
    }
}

/// `backend_url` is prepended to relative screenshot paths.
pub fn process_deposit_request(v: &Value, backend_url: &str) -> DepositRequest {
    let screenshot = text(v, &["screenshotUrl", "screenshot"])
        .map(|path| {
            if path.starts_with("http") {
                path
            } else {
                format!("{}{}", backend_url, path)
            }
        })
        .unwrap_or_default();

    let (user_id, user_email) = match populated(v, "user") {
        Some(u) => (text(u, &["_id"]), text(u, &["email"])),
        None => (text(v, &["user"]), text(v, &["userEmail"])),
    };

    DepositRequest {
        id: text(v, &["_id", "id"]).unwrap_or_default(),
        user_id: user_id.unwrap_or_default(),
        user_email: user_email.unwrap_or_else(|| "N/A".to_string()),
        amount: number(v, &["amount"]).unwrap_or(0.0),
        transaction_id: text(v, &["transactionId"]).unwrap_or_else(|| "N/A".to_string()),
        screenshot,
        status: status_of(v),
        date: created_at(v),
    }
}

pub fn process_withdrawal_request(v: &Value) -> WithdrawalRequest {
    let mut user_id = String::new();
    let mut user_email = "N/A".to_string();
    let mut user_name = None;
    let mut user_wallet_balance = None;

    if let Some(u) = populated(v, "user") {
        user_id = text(u, &["_id"]).unwrap_or_default();
        user_email = text(u, &["email"]).unwrap_or_else(|| "N/A".to_string());
        let name = format!(
            "{} {}",
            text(u, &["firstName"]).unwrap_or_default(),
            text(u, &["lastName"]).unwrap_or_default()
        );
        let name = name.trim();
        if !name.is_empty() {
            user_name = Some(name.to_string());
        }
        user_wallet_balance = number(u, &["balance"]);
    } else if let Some(id) = text(v, &["user"]) {
        user_id = id;
    }

    let na = || "N/A".to_string();
    WithdrawalRequest {
        id: text(v, &["_id", "id"]).unwrap_or_default(),
        user_id,
        user_email,
        user_name,
        user_wallet_balance,
        amount: number(v, &["amount"]).unwrap_or(0.0),
        received_amount: number(v, &["receivable", "recived_amount", "receivedAmount"])
            .unwrap_or(0.0),
        wallet_name: text(v, &["walletName"]).unwrap_or_else(na),
        wallet_address: text(v, &["walletAddress", "destinationAddress"]).unwrap_or_else(na),
        network: text(v, &["network"]).unwrap_or_else(na),
        status: status_of(v),
        date: created_at(v),
    }
}

pub fn process_referred_user(v: &Value) -> ReferredUser {
    let balance = number(v, &["balance"]).unwrap_or(0.0);
    let name = format!(
        "{} {}",
        text(v, &["firstName"]).unwrap_or_default(),
        text(v, &["lastName"]).unwrap_or_default()
    );
    ReferredUser {
        id: text(v, &["_id", "id"]).unwrap_or_default(),
        name: name.trim().to_string(),
        join_date: created_at(v),
        status: if balance > 0.0 { "Active" } else { "Pending" }.to_string(),
        balance,
    }
}

pub fn process_notification(v: &Value) -> Notification {
    Notification {
        id: text(v, &["_id", "id"]).unwrap_or_default(),
        user_id: text(v, &["user"]),
        title: text(v, &["title"]).unwrap_or_default(),
        content: text(v, &["message", "content"]).unwrap_or_default(),
        date: created_at(v),
    }
}

/// Normalize `/api/team/levels`. Levels are returned in key order.
pub fn process_team_levels(v: &Value) -> TeamLevels {
    let mut levels: Vec<TeamLevel> = v
        .get("levels")
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .map(|(level, body)| {
                    let members = body
                        .get("members")
                        .and_then(Value::as_array)
                        .map(|ms| {
                            ms.iter()
                                .map(|m| TeamMember {
                                    id: text(m, &["_id", "id"]).unwrap_or_default(),
                                    name: text(m, &["name"]).unwrap_or_default(),
                                    join_date: format_date(m.get("joinDate").and_then(Value::as_str)),
                                    status: text(m, &["status"]).unwrap_or_default(),
                                    investment: number(m, &["investment"]).unwrap_or(0.0),
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    let mut details = body.as_object().cloned().unwrap_or_default();
                    details.remove("members");
                    TeamLevel {
                        level: level.clone(),
                        members,
                        details,
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    levels.sort_by_key(|l| l.level.parse::<u32>().unwrap_or(u32::MAX));

    TeamLevels {
        levels,
        applied_tier: number(v, &["appliedTier"]).map(|t| t.max(0.0) as u32),
    }
}

/// Overlay `value` onto `key`, dropping the key when the source is absent so
/// the user processor falls back to its own default.
fn overlay(target: &mut Map<String, Value>, key: &str, value: Option<&Value>) {
    match value.filter(|v| !v.is_null()) {
        Some(v) => {
            target.insert(key.to_string(), v.clone());
        }
        None => {
            target.remove(key);
        }
    }
}

fn at<'a>(v: &'a Value, section: &str, key: &str) -> Option<&'a Value> {
    v.get(section).and_then(|s| s.get(key))
}

/// Flatten the `/api/dashboard` payload: the user record is enriched from the
/// referral, earnings and network sections before normalization.
pub fn process_dashboard_data(data: &Value) -> DashboardData {
    let mut user = data
        .get("user")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    overlay(&mut user, "referralCode", at(data, "referral", "code"));
    overlay(&mut user, "referralLink", at(data, "referral", "link"));
    overlay(&mut user, "dailyProfit", at(data, "earningsSummary", "todaysProfit"));
    overlay(&mut user, "totalProfit", at(data, "earningsSummary", "totalProfit"));
    overlay(&mut user, "totalWithdrawal", at(data, "networkStats", "withdrawal"));
    overlay(&mut user, "teamSize", at(data, "networkStats", "teamSize"));
    overlay(&mut user, "totalInvested", at(data, "networkStats", "investment"));
    overlay(&mut user, "teamInvested", at(data, "monthlyReward", "teamInvestment"));
    overlay(&mut user, "profitHistory", data.get("profitHistory"));

    let notifications = data
        .get("notifications")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(process_notification).collect())
        .unwrap_or_default();

    let claim = data.get("dailyClaim").cloned().unwrap_or(Value::Null);
    let daily_claim = DailyClaim {
        eligible: flag(&claim, "eligible").unwrap_or(false),
        amount: number(&claim, &["amount"]).unwrap_or(0.0),
        next_claim_at: text(&claim, &["nextClaimAt"])
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    };

    let reward = data.get("monthlyReward").cloned().unwrap_or(Value::Null);
    let monthly_reward = MonthlyReward {
        month: text(&reward, &["month"]).unwrap_or_default(),
        total_investment: number(&reward, &["totalInvestment"]).unwrap_or(0.0),
        team_investment: number(&reward, &["teamInvestment"]).unwrap_or(0.0),
        achieved_tier: text(&reward, &["achievedTier"]).unwrap_or_else(|| "None".to_string()),
        reward_amount: number(&reward, &["rewardAmount"]).unwrap_or(0.0),
        is_claimed: flag(&reward, "isClaimed").unwrap_or(false),
        progress_sum: number(&reward, &["progressSum"]).unwrap_or(0.0),
    };

    DashboardData {
        user: process_user(&Value::Object(user)),
        notifications,
        daily_claim,
        monthly_reward,
    }
}

/// Notifications a viewer may see: users get global ones plus their own,
/// admins see everything.
pub fn visible_notifications<'a>(
    notifications: &'a [Notification],
    viewer: &User,
) -> Vec<&'a Notification> {
    notifications
        .iter()
        .filter(|n| match viewer.role {
            Role::Admin => true,
            Role::User => n.user_id.as_deref().map_or(true, |id| id == viewer.id),
        })
        .collect()
}
