use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodic dashboard refetch.
///
/// Runs `refetch` immediately and then every `every` until `stop` is
/// cancelled. Failures are logged and the loop keeps going. Returns the
/// number of refetches that succeeded.
pub async fn run_refresh_loop<F, Fut, T, E>(every: Duration, stop: CancellationToken, mut refetch: F) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ok = 0u64;

    loop {
        tokio::select! {
            _ = stop.cancelled() => {
                log::info!("Refresh loop stopped after {} successful refetches", ok);
                return ok;
            }
            _ = ticker.tick() => {
                match refetch().await {
                    Ok(_) => ok += 1,
                    Err(e) => log::warn!("Background refetch failed: {}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn refetches_on_schedule_and_survives_failures() {
        let stop = CancellationToken::new();
        let stopper = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(65)).await;
            stopper.cancel();
        });

        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let ok = run_refresh_loop(Duration::from_secs(30), stop, move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 1 {
                    Err("backend down")
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        // Immediately, then at 30s and 60s.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(ok, 2);
    }
}
