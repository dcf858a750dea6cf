//! Fixed-cadence background tasks.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Call `on_tick` every `period` until `shutdown` is cancelled.
///
/// The first tick fires immediately. Ticks never overlap: a slow tick
/// delays the next one and missed ticks are skipped rather than bunched.
pub fn spawn_ticker<F, Fut>(
    name: &'static str,
    period: Duration,
    shutdown: CancellationToken,
    mut on_tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(task = name, period_ms = period.as_millis() as u64, "Ticker started");

        loop {
            tokio::select! {
                _ = interval.tick() => on_tick().await,
                _ = shutdown.cancelled() => {
                    debug!(task = name, "Ticker shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let shutdown = CancellationToken::new();

        let counter = count.clone();
        let handle = spawn_ticker("test", Duration::from_secs(1), shutdown.clone(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(3500)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let ticks = count.load(Ordering::SeqCst);
        assert!((3..=4).contains(&ticks), "got {ticks} ticks");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticks);
    }

    #[tokio::test]
    async fn test_cancel_before_first_tick_completes() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let handle = spawn_ticker("test", Duration::from_secs(60), shutdown, || async {});
        handle.await.unwrap();
    }
}
