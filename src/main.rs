use std::future::Future;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;

use referral_portal::common::{get_runtime_config, ApiClient, ApiError, FileSession, SessionStore};
use referral_portal::services::{
    AdminService, AuthService, Decision, DepositSubmission, RequestQuery, SignupRequest,
    UserFilter, UserService,
};
use referral_portal::universal::claim::{
    format_remaining, ClaimHooks, ClaimModal, ClaimSession, ClaimStatus, TokioClock,
};
use referral_portal::universal::levels::user_level;
use referral_portal::universal::models::{Page, RequestStatus};
use referral_portal::universal::pagination::{accept_page_change, clamp_to_reported, page_window};
use referral_portal::universal::processors::visible_notifications;
use referral_portal::universal::refresh::run_refresh_loop;
use referral_portal::universal::router::{self, View};
use referral_portal::universal::withdraw::{
    fee_tooltip, format_usd, pending_withdrawals_total, quote, WithdrawalConfig, WithdrawalForm,
};

#[derive(Parser)]
#[command(name = "referral-portal", about = "Terminal client for the referral earning portal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Create an account.
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Sponsor's referral code.
        #[arg(long)]
        referral: Option<String>,
    },
    /// Re-send the email verification link.
    ResendVerification {
        #[arg(long)]
        email: String,
    },
    /// Check whether the signed-in account may open a page.
    Open { view: String },
    Dashboard,
    /// Refetch the dashboard periodically until interrupted.
    Watch,
    /// Preview fee and payout for an amount without submitting.
    Quote {
        #[arg(long)]
        amount: String,
        /// Use these balances instead of the signed-in account's.
        #[arg(long)]
        balance: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        pending: f64,
        /// Skip the config fetch and use the built-in fee schedule.
        #[arg(long)]
        offline: bool,
    },
    /// Request a withdrawal.
    Withdraw {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        wallet_name: String,
        #[arg(long)]
        network: String,
        #[arg(long)]
        address: String,
    },
    /// Submit a deposit with its transaction screenshot.
    Deposit {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        transaction_id: String,
        #[arg(long)]
        screenshot: std::path::PathBuf,
    },
    /// Run the daily bonus claim flow.
    Claim,
    /// Referred users, one page at a time.
    Referrals {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
enum AdminCommand {
    Users {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// all | active | inactive | blocked
        #[arg(long, default_value = "all")]
        filter: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    Block { user_id: String },
    Unblock { user_id: String },
    Withdrawals {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Deposits {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        status: Option<String>,
    },
    ApproveWithdrawal { id: String },
    DeclineWithdrawal {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    ApproveDeposit { id: String },
    DeclineDeposit {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Send a notification, to one user or to everyone.
    Notify {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        user_id: Option<String>,
    },
    DeleteNotification { id: String },
    /// Show or set the daily withdrawal limit.
    Limit { value: Option<f64> },
}

/// Terminal stand-ins for the modal collaborators.
struct TerminalHooks;

impl ClaimHooks for TerminalHooks {
    fn on_success_embed(&self) {
        println!("{}", "[ sponsored content ]".dimmed());
    }

    fn on_close(&self) {
        println!("{}", "Claim window closed.".dimmed());
    }
}

fn print_session(s: &ClaimSession) {
    match s.status {
        ClaimStatus::Idle => {}
        ClaimStatus::Counting => println!("Claiming your bonus in... {}", s.countdown.to_string().bold()),
        ClaimStatus::Claiming => println!("{}", "Claiming your bonus... please wait.".yellow()),
        ClaimStatus::Success => println!(
            "{}",
            "Congratulations! Your daily bonus has been claimed. Closing shortly.".green()
        ),
        ClaimStatus::Error => println!("{} {}", "Claim failed:".red(), s.error_message),
        ClaimStatus::Cooldown => {
            let left = s.cooldown_remaining.map(format_remaining).unwrap_or_default();
            println!("Already claimed. Next claim in {} (Ctrl-C to close)", left.cyan());
        }
    }
}

fn parse_status(raw: Option<&str>) -> Option<RequestStatus> {
    raw.filter(|s| !s.eq_ignore_ascii_case("all"))
        .map(|s| RequestStatus::parse(Some(s)))
}

/// Fetch `page`, pulling it back to the last page the server reports when it
/// asked for one past the end. Returns the listing and the page it is for.
async fn fetch_page<T, F, Fut>(page: u32, fetch: F) -> Result<(Page<T>, u32), ApiError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let page = page.max(1);
    let listing = fetch(page).await?;
    let clamped = clamp_to_reported(page, listing.pages);
    if clamped == page {
        return Ok((listing, page));
    }
    log::info!("Page {} is past the last page, showing page {}", page, clamped);
    Ok((fetch(clamped).await?, clamped))
}

fn print_page_footer(page: u32, pages: u32) {
    if let Some(window) = page_window(page, pages) {
        let buttons: Vec<String> = window
            .map(|p| if p == page { format!("[{}]", p) } else { p.to_string() })
            .collect();
        println!("Page {} of {}   {}", page, pages, buttons.join(" "));

        let prev = page.checked_sub(1).and_then(|p| accept_page_change(p, page, pages));
        let next = accept_page_change(page + 1, page, pages);
        let hints: Vec<String> = [("prev", prev), ("next", next)]
            .into_iter()
            .filter_map(|(label, p)| p.map(|p| format!("{}: --page {}", label, p)))
            .collect();
        if !hints.is_empty() {
            println!("{}", hints.join("   ").dimmed());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = get_runtime_config().clone();
    let session: Arc<dyn SessionStore> = Arc::new(FileSession::new(&cfg.session_file));
    let api = ApiClient::new(cfg.clone(), session).context("Failed to build HTTP client")?;

    let auth = AuthService::new(api.clone());
    let user_svc = UserService::new(api.clone());
    let admin = AdminService::new(api.clone());

    match cli.command {
        Command::Login { email, password } => {
            let user = auth.login(&email, &password).await.context("Login failed")?;
            println!("Welcome, {}!", user.display_name().bold());
            println!("Home: {}", router::home(user.role));
        }
        Command::Logout => auth.logout().context("Logout failed")?,
        Command::Register { first_name, last_name, email, password, referral } => {
            let signup = SignupRequest {
                first_name,
                last_name,
                email,
                password,
                phone: None,
                referred_by: referral,
            };
            auth.register(&signup).await.context("Registration failed")?;
            println!("Account created. Check your inbox to verify your email, then log in.");
        }
        Command::ResendVerification { email } => {
            auth.resend_verification(&email)
                .await
                .context("Failed to resend email. Please try again later.")?;
            println!("Verification email sent.");
        }
        Command::Open { view } => {
            let requested: View = view.parse()?;
            let role = if auth.is_logged_in() {
                Some(auth.me().await.context("Failed to load profile")?.role)
            } else {
                None
            };
            let resolved = router::resolve(role, requested)?;
            println!("{}", resolved);
        }
        Command::Dashboard => {
            let data = user_svc.dashboard().await.context("Failed to load dashboard")?;
            let u = &data.user;
            println!("{} <{}>  level {}", u.display_name().bold(), u.email, user_level(u.total_invested));
            println!("Balance:          ${}", format_usd(u.wallet_balance));
            println!("Today's profit:   ${}", format_usd(u.daily_profit));
            println!("Total profit:     ${}", format_usd(u.total_profit));
            println!("Team size:        {}", u.team_size);
            println!("Referral code:    {}", u.referral_code);
            println!(
                "Daily bonus:      {} (${}, next at {})",
                if data.daily_claim.eligible { "available".green() } else { "not yet".yellow() },
                format_usd(data.daily_claim.amount),
                data.daily_claim.next_claim_at
            );
            for n in visible_notifications(&data.notifications, u) {
                println!("  * {} {}: {}", n.date.dimmed(), n.title.bold(), n.content);
            }
        }
        Command::Watch => {
            let stop = CancellationToken::new();
            let stopper = stop.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stopper.cancel();
                }
            });
            let svc = user_svc.clone();
            run_refresh_loop(cfg.refresh_interval(), stop, move || {
                let svc = svc.clone();
                async move {
                    let data = svc.dashboard().await?;
                    println!(
                        "{}  balance ${}  profit today ${}",
                        chrono::Local::now().format("%H:%M:%S"),
                        format_usd(data.user.wallet_balance),
                        format_usd(data.user.daily_profit)
                    );
                    Ok::<_, referral_portal::common::ApiError>(())
                }
            })
            .await;
        }
        Command::Quote { amount, balance, pending, offline } => {
            let config = if offline {
                WithdrawalConfig::fallback()
            } else {
                user_svc.fetch_withdrawal_config().await
            };
            let (wallet, pending) = match balance {
                Some(b) => (b, pending),
                None => {
                    let me = auth.me().await.context("Failed to load balance")?;
                    let history = user_svc.withdrawals().await.unwrap_or_default();
                    (me.wallet_balance, pending_withdrawals_total(&history))
                }
            };
            let q = quote(&amount, wallet, pending, &config);
            println!("{}", fee_tooltip(Some(&config)).dimmed());
            println!("Available:        ${}", format_usd(q.available_balance));
            println!("Amount:           ${}", format_usd(q.requested_amount));
            println!("Fee ({}%):        -${}", q.fee_percentage, format_usd(q.fee));
            println!("You receive:      ${}", format_usd(q.net_payout).green());
            println!("Remaining:        ${}", format_usd(q.remaining_balance));

            let mut form = WithdrawalForm::new(wallet, pending);
            form.set_config(config).map_err(anyhow::Error::msg)?;
            form.amount = amount;
            form.wallet_name = "-".into();
            form.network = "-".into();
            form.wallet_address = "-".into();
            let verdict = form.verdict();
            if !verdict.allowed {
                println!("{} {}", "Cannot submit:".red(), verdict.reason.unwrap_or_default());
            }
        }
        Command::Withdraw { amount, wallet_name, network, address } => {
            let me = auth.me().await.context("Failed to load balance")?;
            let history = user_svc.withdrawals().await.context("Failed to load withdrawal history")?;
            let mut form = WithdrawalForm::new(me.wallet_balance, pending_withdrawals_total(&history));
            form.set_config(user_svc.fetch_withdrawal_config().await)
                .map_err(anyhow::Error::msg)?;
            form.amount = amount;
            form.wallet_name = wallet_name;
            form.network = network;
            form.wallet_address = address;

            if let Some(q) = form.quote() {
                println!(
                    "Fee {}% (-${}), you receive ${}",
                    q.fee_percentage,
                    format_usd(q.fee),
                    format_usd(q.net_payout)
                );
            }
            if !form.submit(&user_svc).await {
                bail!(form.error.unwrap_or_else(|| "Withdrawal failed".to_string()));
            }
            println!("{}", form.success.unwrap_or_default().green());
        }
        Command::Deposit { amount, transaction_id, screenshot } => {
            if !(amount.is_finite() && amount > 0.0) {
                bail!("Please enter a valid amount.");
            }
            let bytes = std::fs::read(&screenshot)
                .with_context(|| format!("Please upload a transaction screenshot ({})", screenshot.display()))?;
            let screenshot_name = screenshot
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "screenshot".to_string());
            user_svc
                .submit_deposit(DepositSubmission { amount, transaction_id, screenshot_name, screenshot: bytes })
                .await
                .context("Failed to submit deposit")?;
            println!("{}", "Deposit submitted for review.".green());
        }
        Command::Claim => {
            let (mut modal, mut views) = ClaimModal::new(TokioClock::new());
            let close = CancellationToken::new();
            let closer = close.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    closer.cancel();
                }
            });
            let printer = tokio::spawn(async move {
                while views.changed().await.is_ok() {
                    let s = views.borrow_and_update().clone();
                    print_session(&s);
                }
            });
            let svc = user_svc.clone();
            let report = modal
                .run(move || async move { svc.claim_daily_bonus().await }, &TerminalHooks, close)
                .await;
            drop(modal);
            let _ = printer.await;
            if report.final_session.status == ClaimStatus::Error {
                bail!(report.final_session.error_message);
            }
        }
        Command::Referrals { page } => {
            let (listing, page) = fetch_page(page, |p| user_svc.referred_users(p, 10))
                .await
                .context("Failed to fetch referred users")?;
            for r in &listing.results {
                println!("{:<24} {:<12} {:<8} ${}", r.name, r.join_date, r.status, format_usd(r.balance));
            }
            print_page_footer(page, listing.pages);
        }
        Command::Admin(cmd) => run_admin(&admin, cmd).await?,
    }

    Ok(())
}

async fn run_admin(admin: &AdminService, cmd: AdminCommand) -> Result<()> {
    match cmd {
        AdminCommand::Users { page, filter, search } => {
            let filter = match filter.to_ascii_lowercase().as_str() {
                "active" => UserFilter::Active,
                "inactive" => UserFilter::Inactive,
                "blocked" => UserFilter::Blocked,
                _ => UserFilter::All,
            };
            let (listing, page) = fetch_page(page, |p| admin.users(p, filter, &search))
                .await
                .context("Failed to fetch users")?;
            for u in &listing.results {
                println!(
                    "{:<26} {:<28} L{} {:?} ${}",
                    u.id,
                    u.email,
                    user_level(u.total_invested),
                    u.status,
                    format_usd(u.wallet_balance)
                );
            }
            print_page_footer(page, listing.pages);
        }
        AdminCommand::Block { user_id } => admin.set_user_blocked(&user_id, true).await?,
        AdminCommand::Unblock { user_id } => admin.set_user_blocked(&user_id, false).await?,
        AdminCommand::Withdrawals { page, status, from, to } => {
            let base = RequestQuery {
                page,
                status: parse_status(status.as_deref()),
                start_date: from,
                end_date: to,
            };
            let (listing, page) = fetch_page(page, |p| {
                let q = RequestQuery { page: p, ..base.clone() };
                async move { admin.withdrawals(&q).await }
            })
            .await
            .context("Failed to fetch withdrawal requests")?;
            for w in &listing.results {
                println!(
                    "{} {} {:<24} ${} -> ${} {} {} {:?}",
                    w.date,
                    w.id,
                    w.user_email,
                    format_usd(w.amount),
                    format_usd(w.received_amount),
                    w.network,
                    w.wallet_address,
                    w.status
                );
            }
            print_page_footer(page, listing.pages);
        }
        AdminCommand::Deposits { page, status } => {
            let base = RequestQuery {
                page,
                status: parse_status(status.as_deref()),
                ..RequestQuery::default()
            };
            let (listing, page) = fetch_page(page, |p| {
                let q = RequestQuery { page: p, ..base.clone() };
                async move { admin.deposits(&q).await }
            })
            .await
            .context("Failed to fetch deposit requests")?;
            for d in &listing.results {
                println!(
                    "{} {} {:<24} ${} tx={} {:?} {}",
                    d.date,
                    d.id,
                    d.user_email,
                    format_usd(d.amount),
                    d.transaction_id,
                    d.status,
                    d.screenshot
                );
            }
            print_page_footer(page, listing.pages);
        }
        AdminCommand::ApproveWithdrawal { id } => {
            admin.decide_withdrawal(&id, Decision::Approve, None).await?
        }
        AdminCommand::DeclineWithdrawal { id, reason } => {
            admin.decide_withdrawal(&id, Decision::Decline, reason.as_deref()).await?
        }
        AdminCommand::ApproveDeposit { id } => admin.decide_deposit(&id, Decision::Approve, None).await?,
        AdminCommand::DeclineDeposit { id, reason } => {
            admin.decide_deposit(&id, Decision::Decline, reason.as_deref()).await?
        }
        AdminCommand::Notify { title, message, user_id } => {
            let n = admin
                .create_notification(&title, &message, user_id.as_deref())
                .await
                .context("Failed to send notification")?;
            println!("Sent notification {}", n.id);
        }
        AdminCommand::DeleteNotification { id } => admin.delete_notification(&id).await?,
        AdminCommand::Limit { value } => match value {
            Some(limit) => {
                admin.set_withdrawal_limit(limit).await?;
                println!("Daily withdrawal limit set to ${}", format_usd(limit));
            }
            None => println!("Daily withdrawal limit: ${}", format_usd(admin.withdrawal_limit().await?)),
        },
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn listing(pages: u32) -> Page<u32> {
        Page { results: vec![], pages }
    }

    #[tokio::test]
    async fn page_past_the_end_is_refetched_at_the_last_page() {
        let requested = Mutex::new(Vec::new());
        let (page, shown) = fetch_page(9, |p| {
            requested.lock().unwrap().push(p);
            async { Ok::<_, ApiError>(listing(3)) }
        })
        .await
        .unwrap();
        assert_eq!(shown, 3);
        assert_eq!(page.pages, 3);
        assert_eq!(*requested.lock().unwrap(), [9, 3]);
    }

    #[tokio::test]
    async fn pages_in_range_are_fetched_once() {
        let requested = Mutex::new(Vec::new());
        let fetch = |p: u32| {
            requested.lock().unwrap().push(p);
            async { Ok::<_, ApiError>(listing(0)) }
        };
        // Zero reported pages leaves the request alone.
        let (_, shown) = fetch_page(4, &fetch).await.unwrap();
        assert_eq!(shown, 4);
        // Page 0 is treated as the first page.
        let (_, shown) = fetch_page(0, &fetch).await.unwrap();
        assert_eq!(shown, 1);
        assert_eq!(*requested.lock().unwrap(), [4, 1]);
    }
}
