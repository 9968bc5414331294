use std::future::Future;
use std::time::Duration;

use futures::future::{Fuse, FusedFuture, FutureExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::common::ApiError;

use super::{Clock, ClaimEffect, ClaimMachine, ClaimOutcome, ClaimSession, ClaimStatus};

const SECOND: Duration = Duration::from_secs(1);

/// Collaborators the modal calls out to.
pub trait ClaimHooks: Send + Sync {
    /// Embed the sponsor content in the success view. Called at most once per lifecycle.
    fn on_success_embed(&self);
    /// Hand control back to the host. Called exactly once when a lifecycle ends.
    fn on_close(&self);
}

/// How a lifecycle ended.
#[derive(Clone, Debug, PartialEq)]
pub struct ClaimReport {
    /// Last session shown before the modal reset to idle.
    pub final_session: ClaimSession,
    /// `true` when the success screen closed itself.
    pub auto_closed: bool,
}

/// Drives a `ClaimMachine` in real (tokio) time: the one-second timer, the
/// claim request and the close signal, all multiplexed on one task.
pub struct ClaimModal<C: Clock> {
    machine: ClaimMachine,
    clock: C,
    views: watch::Sender<ClaimSession>,
}

impl<C: Clock> ClaimModal<C> {
    pub fn new(clock: C) -> (Self, watch::Receiver<ClaimSession>) {
        let machine = ClaimMachine::new();
        let (views, rx) = watch::channel(machine.session());
        (
            Self {
                machine,
                clock,
                views,
            },
            rx,
        )
    }

    pub fn machine(&self) -> &ClaimMachine {
        &self.machine
    }

    /// Open the modal and run it until it is closed.
    ///
    /// `claim` is invoked at most once, when the countdown ends. Cancelling
    /// `close` ends the lifecycle, except while the claim is in flight: then
    /// the close is held back until the claim has resolved.
    ///
    /// The claim runs on its own task and is never aborted. If this future is
    /// dropped mid-claim the request still completes and its result is
    /// discarded.
    pub async fn run<F, Fut, H>(&mut self, claim: F, hooks: &H, close: CancellationToken) -> ClaimReport
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
        H: ClaimHooks + ?Sized,
    {
        // A previous run dropped mid-claim can no longer receive its result.
        self.machine.abandon();
        self.machine.open();
        self.publish(hooks);

        let mut ticker = interval_at(Instant::now() + SECOND, SECOND);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut claim = Some(claim);
        let mut claim_generation = 0u64;
        let in_flight: Fuse<JoinHandle<Result<(), ApiError>>> = Fuse::terminated();
        tokio::pin!(in_flight);
        let mut close_requested = false;

        loop {
            if close_requested && self.machine.status() != ClaimStatus::Claiming {
                return self.finish(hooks, false);
            }

            tokio::select! {
                _ = close.cancelled(), if !close_requested => {
                    close_requested = true;
                    if self.machine.status() == ClaimStatus::Claiming {
                        log::info!("Close requested while claiming, waiting for the claim to finish");
                    }
                }
                res = &mut in_flight, if !in_flight.is_terminated() => {
                    let outcome = match res {
                        Ok(result) => ClaimOutcome::from(result),
                        Err(err) => {
                            log::error!("Claim task failed: {}", err);
                            ClaimOutcome::Failed { message: None }
                        }
                    };
                    let now = self.clock.now();
                    self.machine.resolve(claim_generation, outcome, now);
                    // Next state's timer starts a full second from now.
                    ticker.reset();
                    self.publish(hooks);
                }
                _ = ticker.tick(), if self.machine.active_timer().is_some() => {
                    let effect = self.machine.tick(self.clock.now());
                    self.publish(hooks);
                    match effect {
                        Some(ClaimEffect::StartClaim { generation }) => match claim.take() {
                            Some(f) => {
                                claim_generation = generation;
                                in_flight.set(tokio::spawn(f()).fuse());
                            }
                            None => log::error!("Claim already started in this lifecycle"),
                        },
                        Some(ClaimEffect::AutoClose) => return self.finish(hooks, true),
                        Some(ClaimEffect::InjectAd) | None => {}
                    }
                }
                else => {
                    // Nothing left to wait on: idle state with the close already consumed.
                    return self.finish(hooks, false);
                }
            }
        }
    }

    fn publish<H: ClaimHooks + ?Sized>(&mut self, hooks: &H) {
        let (session, effect) = self.machine.render();
        if effect == Some(ClaimEffect::InjectAd) {
            hooks.on_success_embed();
        }
        self.views.send_replace(session);
    }

    fn finish<H: ClaimHooks + ?Sized>(&mut self, hooks: &H, auto_closed: bool) -> ClaimReport {
        let final_session = self.machine.session();
        if let Err(err) = self.machine.close() {
            log::error!("Unable to close claim modal: {}", err);
        }
        hooks.on_close();
        self.views.send_replace(self.machine.session());
        log::info!(
            "Claim modal closed in state {:?} (auto_closed={})",
            final_session.status,
            auto_closed
        );
        ClaimReport {
            final_session,
            auto_closed,
        }
    }
}
