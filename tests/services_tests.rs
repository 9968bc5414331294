//! Service calls against a local one-shot HTTP responder.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use referral_portal::common::{ApiClient, MemorySession, RuntimeConfig};
use referral_portal::services::UserService;
use referral_portal::universal::withdraw::{ValidatedWithdrawal, WithdrawalConfig};

fn service(backend_url: &str) -> UserService {
    let cfg = RuntimeConfig {
        backend_url: backend_url.to_string(),
        retry_attempts: 1,
        ..RuntimeConfig::default()
    };
    let api = ApiClient::new(cfg, Arc::new(MemorySession::with_token("tok"))).unwrap();
    UserService::new(api)
}

/// Answer exactly one request with `status` and a JSON `body`. The handle
/// yields the raw request (headers and body) that was received.
async fn respond_once(status: &'static str, body: Value) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..n]);
            if request_complete(&received) {
                break;
            }
        }

        let payload = body.to_string();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            payload.len(),
            payload
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&received).to_string()
    });

    (base_url, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}

#[tokio::test]
async fn withdrawal_config_falls_back_when_backend_is_unreachable() {
    let svc = service("http://127.0.0.1:1");
    assert_eq!(svc.fetch_withdrawal_config().await, WithdrawalConfig::fallback());
}

#[tokio::test]
async fn withdrawal_config_falls_back_when_schedule_is_invalid() {
    let (url, server) = respond_once(
        "200 OK",
        json!({
            "standardFeePercentage": -6,
            "highBalanceFeePercentage": 20,
            "highBalanceThreshold": 0.8,
            "minimumWithdrawal": 35,
            "dailyWithdrawalLimit": 500
        }),
    )
    .await;

    let cfg = service(&url).fetch_withdrawal_config().await;
    assert_eq!(cfg, WithdrawalConfig::fallback());

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/system/public/withdrawal-config"));
    // Public endpoint: no bearer token.
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn withdrawal_config_from_backend_is_used() {
    let (url, server) = respond_once(
        "200 OK",
        json!({
            "standardFeePercentage": 5,
            "highBalanceFeePercentage": 15,
            "highBalanceThreshold": 0.9,
            "minimumWithdrawal": 50,
            "dailyWithdrawalLimit": 1000
        }),
    )
    .await;

    let cfg = service(&url).fetch_withdrawal_config().await;
    assert_eq!(cfg.standard_fee_percentage, 5.0);
    assert_eq!(cfg.high_balance_threshold, 0.9);
    assert_eq!(cfg.minimum_withdrawal, 50.0);
    server.await.unwrap();
}

#[tokio::test]
async fn submit_withdrawal_sends_destination_address() {
    let (url, server) = respond_once("201 Created", json!({ "message": "ok" })).await;
    let request = ValidatedWithdrawal {
        amount: 100.0,
        wallet_address: "TXabc".into(),
        wallet_name: "Trust".into(),
        network: "TRC20".into(),
    };

    service(&url).submit_withdrawal(&request).await.unwrap();

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/withdrawals"));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer tok"));
    let body: Value = serde_json::from_str(raw.split("\r\n\r\n").nth(1).unwrap()).unwrap();
    assert_eq!(body["destinationAddress"], "TXabc");
    assert_eq!(body["walletName"], "Trust");
    assert_eq!(body["network"], "TRC20");
    assert_eq!(body["amount"], 100.0);
}

#[tokio::test]
async fn already_claimed_response_carries_next_claim_at() {
    let (url, server) = respond_once(
        "400 Bad Request",
        json!({
            "message": "Bonus already claimed today",
            "data": { "nextClaimAt": "2024-05-02T00:00:00.000Z" }
        }),
    )
    .await;

    let err = service(&url).claim_daily_bonus().await.unwrap_err();
    assert_eq!(err.message(), "Bonus already claimed today");
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.next_claim_at().map(|t| t.to_rfc3339()),
        Some("2024-05-02T00:00:00+00:00".to_string())
    );
    assert!(server.await.unwrap().starts_with("POST /api/rewards/daily-claim"));
}
