//! Payload normalization against the shapes the backend actually sends.

use serde_json::json;

use referral_portal::universal::models::{AccountStatus, RequestStatus, Role};
use referral_portal::universal::processors::{
    format_date, process_dashboard_data, process_deposit_request, process_notification,
    process_referred_user, process_team_levels, process_user, process_withdrawal_request,
    visible_notifications,
};

#[test]
fn user_accepts_legacy_field_names() {
    let u = process_user(&json!({
        "_id": "u1",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "role": "ADMIN",
        "ballence": "125.5",
        "teamCount": 4,
        "createdAt": "2024-03-09T22:15:00.000Z"
    }));
    assert_eq!(u.id, "u1");
    assert_eq!(u.display_name(), "Ada Lovelace");
    assert_eq!(u.role, Role::Admin);
    assert_eq!(u.status, AccountStatus::Active);
    assert_eq!(u.wallet_balance, 125.5);
    assert_eq!(u.team_size, 4);
    assert_eq!(u.join_date, "2024-03-09");
    // No referral code: falls back to the email's local part.
    assert_eq!(u.referral_code, "ada");
}

#[test]
fn inactive_user_is_blocked() {
    let u = process_user(&json!({ "id": "u2", "isActive": false }));
    assert_eq!(u.status, AccountStatus::Blocked);
    let u = process_user(&json!({ "id": "u3", "status": "blocked" }));
    assert_eq!(u.status, AccountStatus::Blocked);
    assert_eq!(u.role, Role::User);
}

#[test]
fn deposit_screenshot_is_made_absolute() {
    let relative = process_deposit_request(
        &json!({
            "_id": "d1",
            "user": { "_id": "u1", "email": "a@b.c" },
            "amount": 100,
            "screenshotUrl": "/uploads/tx.png",
            "status": "approved",
            "createdAt": "2024-01-02T03:04:05Z"
        }),
        "http://api.local",
    );
    assert_eq!(relative.screenshot, "http://api.local/uploads/tx.png");
    assert_eq!(relative.user_email, "a@b.c");
    assert_eq!(relative.status, RequestStatus::Approved);
    assert_eq!(relative.transaction_id, "N/A");

    let absolute = process_deposit_request(
        &json!({ "_id": "d2", "user": "u9", "screenshot": "https://cdn/x.png" }),
        "http://api.local",
    );
    assert_eq!(absolute.screenshot, "https://cdn/x.png");
    assert_eq!(absolute.user_id, "u9");
    assert_eq!(absolute.user_email, "N/A");
    assert_eq!(absolute.status, RequestStatus::Pending);
}

#[test]
fn withdrawal_reads_populated_user_and_aliases() {
    let w = process_withdrawal_request(&json!({
        "_id": "w1",
        "user": { "_id": "u1", "email": "a@b.c", "firstName": "Ada", "balance": 900 },
        "amount": 100,
        "recived_amount": 94,
        "destinationAddress": "TXabc",
        "status": "rejected"
    }));
    assert_eq!(w.user_name.as_deref(), Some("Ada"));
    assert_eq!(w.user_wallet_balance, Some(900.0));
    assert_eq!(w.received_amount, 94.0);
    assert_eq!(w.wallet_address, "TXabc");
    assert_eq!(w.wallet_name, "N/A");
    assert_eq!(w.status, RequestStatus::Declined);
}

#[test]
fn referred_user_status_follows_balance() {
    let active = process_referred_user(&json!({ "_id": "r1", "firstName": "Bo", "balance": 10 }));
    assert_eq!(active.status, "Active");
    assert_eq!(active.name, "Bo");
    let pending = process_referred_user(&json!({ "_id": "r2", "balance": 0 }));
    assert_eq!(pending.status, "Pending");
}

#[test]
fn team_levels_are_sorted_numerically() {
    let t = process_team_levels(&json!({
        "appliedTier": 2,
        "levels": {
            "10": { "members": [], "commissionRate": 1 },
            "2": { "members": [{ "_id": "m1", "name": "Cy", "investment": 50, "joinDate": "2024-02-01T00:00:00Z" }] },
            "1": { "members": [] }
        }
    }));
    let order: Vec<&str> = t.levels.iter().map(|l| l.level.as_str()).collect();
    assert_eq!(order, ["1", "2", "10"]);
    assert_eq!(t.levels[1].members[0].join_date, "2024-02-01");
    assert_eq!(t.levels[2].details.get("commissionRate"), Some(&json!(1)));
    assert!(t.levels[2].details.get("members").is_none());
    assert_eq!(t.applied_tier, Some(2));
}

#[test]
fn dashboard_sections_overlay_the_user() {
    let d = process_dashboard_data(&json!({
        "user": { "_id": "u1", "email": "ada@example.com", "balance": 50, "referralCode": "old" },
        "referral": { "code": "ADA42", "link": "https://x/r/ADA42" },
        "earningsSummary": { "todaysProfit": 1.5, "totalProfit": 30 },
        "networkStats": { "teamSize": 7, "investment": 1000 },
        "dailyClaim": { "eligible": true, "amount": 2, "nextClaimAt": "2024-05-02T00:00:00.000Z" },
        "monthlyReward": { "month": "2024-05", "teamInvestment": 400 },
        "notifications": [{ "_id": "n1", "title": "Hi", "message": "Welcome" }]
    }));
    assert_eq!(d.user.referral_code, "ADA42");
    assert_eq!(d.user.referral_link.as_deref(), Some("https://x/r/ADA42"));
    assert_eq!(d.user.daily_profit, 1.5);
    assert_eq!(d.user.total_profit, 30.0);
    assert_eq!(d.user.team_size, 7);
    assert_eq!(d.user.total_invested, 1000.0);
    assert_eq!(d.user.team_invested, 400.0);
    assert_eq!(d.user.wallet_balance, 50.0);
    assert!(d.daily_claim.eligible);
    assert_eq!(d.daily_claim.next_claim_at, "2024-05-02T00:00:00.000Z");
    assert_eq!(d.monthly_reward.achieved_tier, "None");
    assert_eq!(d.notifications.len(), 1);
    assert_eq!(d.notifications[0].content, "Welcome");
}

#[test]
fn users_only_see_global_and_their_own_notifications() {
    let all = vec![
        process_notification(&json!({ "_id": "g", "title": "Global" })),
        process_notification(&json!({ "_id": "mine", "user": "u1" })),
        process_notification(&json!({ "_id": "theirs", "user": "u2" })),
    ];
    let user = process_user(&json!({ "_id": "u1" }));
    let ids: Vec<&str> = visible_notifications(&all, &user)
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(ids, ["g", "mine"]);

    let admin = process_user(&json!({ "_id": "a1", "role": "admin" }));
    assert_eq!(visible_notifications(&all, &admin).len(), 3);
}

#[test]
fn dates_fall_back_sensibly() {
    assert_eq!(format_date(Some("2024-06-30")), "2024-06-30");
    assert_eq!(format_date(Some("2024-06-30T23:59:59+02:00")), "2024-06-30");
    assert_eq!(format_date(Some("yesterday")), "yesterday");
    assert_eq!(format_date(None).len(), 10);
}
