//! The recurring one-second driver behind running timers.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// A spawned task calling `on_tick` once per period until stopped.
///
/// Dropping the driver stops it, so it cannot outlive its owner. Late ticks
/// are delayed, never burst: a suspended process loses the missed seconds
/// instead of replaying them.
#[derive(Debug)]
pub struct TickDriver {
    handle: JoinHandle<()>,
}

impl TickDriver {
    /// Starts ticking on `runtime`. The first tick fires one `period` from now.
    ///
    /// `period` must be non-zero.
    pub fn start(
        runtime: &Handle,
        period: Duration,
        mut on_tick: impl FnMut() + Send + 'static,
    ) -> Self {
        let handle = runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        tracing::debug!(?period, "tick driver started");
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the driver. Equivalent to dropping it.
    pub fn stop(self) {}
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::debug!("tick driver stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_driver(period: Duration) -> (TickDriver, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let driver = TickDriver::start(&Handle::current(), period, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (driver, count)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (driver, count) = counting_driver(Duration::from_secs(1));

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(driver.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_ticking() {
        let (driver, count) = counting_driver(Duration::from_secs(1));

        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        driver.stop();
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_ends_ticking() {
        let (driver, count) = counting_driver(Duration::from_secs(1));
        drop(driver);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
