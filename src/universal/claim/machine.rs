use chrono::{DateTime, Duration, Utc};

use crate::common::ApiError;

use super::{
    ActiveTimer, ClaimEffect, ClaimError, ClaimSession, ClaimStatus, DEFAULT_CLAIM_ERROR,
    PRE_CLAIM_SECONDS, SUCCESS_AUTO_CLOSE_SECONDS,
};

/// Result of the backend claim, already normalized.
#[derive(Clone, Debug, PartialEq)]
pub enum ClaimOutcome {
    Claimed,
    /// Already claimed; the next claim opens at `next_claim_at`.
    Cooldown { next_claim_at: DateTime<Utc> },
    Failed { message: Option<String> },
}

impl From<Result<(), ApiError>> for ClaimOutcome {
    fn from(res: Result<(), ApiError>) -> Self {
        match res {
            Ok(()) => ClaimOutcome::Claimed,
            Err(err) => match err.next_claim_at() {
                Some(next_claim_at) => ClaimOutcome::Cooldown { next_claim_at },
                None => {
                    let message = err.message();
                    ClaimOutcome::Failed {
                        message: if message.trim().is_empty() {
                            None
                        } else {
                            Some(message)
                        },
                    }
                }
            },
        }
    }
}

/// Transition function of the daily bonus claim flow.
///
/// Time only enters through `tick` (one call per elapsed second) and the
/// `now` arguments, so every path can be driven deterministically.
/// At most one timer is meaningful at a time, see `active_timer`.
#[derive(Debug, Clone)]
pub struct ClaimMachine {
    status: ClaimStatus,
    countdown: u32,
    cooldown_target: Option<DateTime<Utc>>,
    cooldown_remaining: Option<Duration>,
    error_message: String,
    /// Bumped on every open; claim results from an older lifecycle are dropped.
    generation: u64,
    success_ticks: u32,
    auto_close_sent: bool,
    ad_injected: bool,
}

impl Default for ClaimMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimMachine {
    pub fn new() -> Self {
        Self {
            status: ClaimStatus::Idle,
            countdown: PRE_CLAIM_SECONDS,
            cooldown_target: None,
            cooldown_remaining: None,
            error_message: String::new(),
            generation: 0,
            success_ticks: 0,
            auto_close_sent: false,
            ad_injected: false,
        }
    }

    #[inline]
    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    #[inline]
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session(&self) -> ClaimSession {
        ClaimSession {
            status: self.status,
            countdown: self.countdown,
            cooldown_target: self.cooldown_target,
            cooldown_remaining: self.cooldown_remaining,
            error_message: self.error_message.clone(),
        }
    }

    pub fn active_timer(&self) -> Option<ActiveTimer> {
        match self.status {
            ClaimStatus::Counting => Some(ActiveTimer::PreClaim),
            ClaimStatus::Cooldown => Some(ActiveTimer::Cooldown),
            ClaimStatus::Success if !self.auto_close_sent => Some(ActiveTimer::AutoClose),
            _ => None,
        }
    }

    /// Modal opened: start a fresh countdown.
    ///
    /// Ignored while a claim is in flight, since that lifecycle cannot end yet.
    pub fn open(&mut self) {
        if self.status == ClaimStatus::Claiming {
            log::warn!("Ignoring open while a claim is in flight");
            return;
        }
        self.reset();
        self.generation = self.generation.wrapping_add(1);
        self.status = ClaimStatus::Counting;
        log::info!("Claim modal opened (generation {})", self.generation);
    }

    /// One second elapsed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<ClaimEffect> {
        match self.status {
            ClaimStatus::Counting => {
                self.countdown = self.countdown.saturating_sub(1);
                log::debug!("Claim countdown: {}", self.countdown);
                if self.countdown == 0 {
                    self.status = ClaimStatus::Claiming;
                    log::info!("Countdown finished, claiming bonus");
                    return Some(ClaimEffect::StartClaim {
                        generation: self.generation,
                    });
                }
                None
            }
            ClaimStatus::Cooldown => {
                self.refresh_cooldown(now);
                None
            }
            ClaimStatus::Success if !self.auto_close_sent => {
                self.success_ticks += 1;
                if self.success_ticks >= SUCCESS_AUTO_CLOSE_SECONDS {
                    self.auto_close_sent = true;
                    return Some(ClaimEffect::AutoClose);
                }
                None
            }
            _ => None,
        }
    }

    /// Feed back the result of the claim started for `generation`.
    ///
    /// Returns `false` when the result is stale (modal closed or reopened
    /// since, or no claim pending) and was ignored.
    pub fn resolve(&mut self, generation: u64, outcome: ClaimOutcome, now: DateTime<Utc>) -> bool {
        if generation != self.generation || self.status != ClaimStatus::Claiming {
            log::debug!(
                "Dropping stale claim result (generation {}, current {}, status {:?})",
                generation,
                self.generation,
                self.status
            );
            return false;
        }

        match outcome {
            ClaimOutcome::Claimed => {
                log::info!("Daily bonus claimed");
                self.status = ClaimStatus::Success;
                self.success_ticks = 0;
                self.auto_close_sent = false;
            }
            ClaimOutcome::Cooldown { next_claim_at } => {
                log::info!("Bonus already claimed, next claim at {}", next_claim_at);
                self.status = ClaimStatus::Cooldown;
                self.cooldown_target = Some(next_claim_at);
                self.refresh_cooldown(now);
            }
            ClaimOutcome::Failed { message } => {
                let message = message.unwrap_or_else(|| DEFAULT_CLAIM_ERROR.to_string());
                log::warn!("Claim failed: {}", message);
                self.status = ClaimStatus::Error;
                self.error_message = message;
            }
        }
        true
    }

    /// Give up on a claim whose result can no longer be delivered, such as
    /// after the driver was dropped mid-claim. The next `open` starts a new
    /// generation, so the old result is stale if it ever shows up.
    pub fn abandon(&mut self) {
        if self.status == ClaimStatus::Claiming {
            log::warn!("Abandoning claim of generation {}", self.generation);
            self.reset();
        }
    }

    /// Modal closed by the user or by auto-close.
    pub fn close(&mut self) -> Result<(), ClaimError> {
        if self.status == ClaimStatus::Claiming {
            return Err(ClaimError::CloseWhileClaiming);
        }
        self.reset();
        Ok(())
    }

    /// Snapshot for display, plus the ad embed the first time the success
    /// view is rendered in this lifecycle.
    pub fn render(&mut self) -> (ClaimSession, Option<ClaimEffect>) {
        let effect = if self.status == ClaimStatus::Success && !self.ad_injected {
            self.ad_injected = true;
            Some(ClaimEffect::InjectAd)
        } else {
            None
        };
        (self.session(), effect)
    }

    fn refresh_cooldown(&mut self, now: DateTime<Utc>) {
        self.cooldown_remaining = self.cooldown_target.map(|target| {
            let left = target - now;
            if left < Duration::zero() {
                Duration::zero()
            } else {
                left
            }
        });
    }

    fn reset(&mut self) {
        self.status = ClaimStatus::Idle;
        self.countdown = PRE_CLAIM_SECONDS;
        self.cooldown_target = None;
        self.cooldown_remaining = None;
        self.error_message.clear();
        self.success_ticks = 0;
        self.auto_close_sent = false;
        self.ad_injected = false;
    }
}
