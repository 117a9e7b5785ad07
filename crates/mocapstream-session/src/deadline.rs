//! Rolling session deadline and the watchdog that enforces it.
//!
//! The frame reader pushes the deadline forward before every read; the
//! watchdog sleeps until the deadline and re-reads it each time it wakes.
//! The session is aborted only when the watchdog wakes and finds the
//! deadline has not moved.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{trace, warn};

/// Window granted to each frame read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Shared "no activity beyond this instant" timestamp.
///
/// The stored instant only moves forward: every extension sets it to
/// `max(current, now + timeout)`.
///
/// The instant lives in a `watch::Sender` used as a shared cell. It is
/// `Send + Sync` without a lock, and `send_if_modified` does the
/// compare-and-raise in one step. Nobody subscribes: the deadline only
/// moves later, so the watchdog re-reads it when its timer fires instead
/// of waiting on `changed()`.
#[derive(Debug)]
pub struct DeadlineClock {
    timeout: Duration,
    deadline: watch::Sender<Instant>,
}

impl DeadlineClock {
    /// Create a clock whose first deadline is one timeout from now.
    pub fn new(timeout: Duration) -> Self {
        Self::starting_at(Instant::now(), timeout)
    }

    /// Create a clock whose first deadline is one timeout after `start`.
    pub fn starting_at(start: Instant, timeout: Duration) -> Self {
        let (deadline, _) = watch::channel(start + timeout);
        Self { timeout, deadline }
    }

    /// Extend the deadline to one timeout from now.
    pub fn extend(&self) -> Instant {
        self.extend_from(Instant::now())
    }

    /// Extend the deadline to one timeout after `now`, never moving it back.
    ///
    /// Returns the deadline in effect after the call.
    pub fn extend_from(&self, now: Instant) -> Instant {
        let candidate = now + self.timeout;
        self.deadline.send_if_modified(|deadline| {
            if candidate > *deadline {
                *deadline = candidate;
                true
            } else {
                false
            }
        });
        let deadline = self.deadline();
        trace!(?deadline, "deadline extended");
        deadline
    }

    /// Current deadline.
    pub fn deadline(&self) -> Instant {
        *self.deadline.borrow()
    }

    /// Window added by each extension.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Wait until the clock's deadline passes without being extended.
///
/// Returns the deadline that expired. A timer armed for a stale deadline
/// just loops and re-arms against the latest value.
pub async fn watchdog(clock: &DeadlineClock) -> Instant {
    loop {
        let deadline = clock.deadline();
        if Instant::now() >= deadline {
            warn!(timeout = ?clock.timeout(), "deadline expired");
            return deadline;
        }
        tokio::time::sleep_until(deadline).await;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn initial_deadline_is_one_timeout_out() {
        let start = Instant::now();
        let clock = DeadlineClock::new(Duration::from_secs(1));

        assert_eq!(clock.deadline(), start + Duration::from_secs(1));
        assert!(Instant::now() < clock.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn extension_never_moves_deadline_back() {
        let start = Instant::now();
        let clock = DeadlineClock::starting_at(start, Duration::from_secs(1));

        let later = clock.extend_from(start + Duration::from_millis(700));
        assert_eq!(later, start + Duration::from_millis(1700));

        let earlier = clock.extend_from(start + Duration::from_millis(200));
        assert_eq!(earlier, later);
        assert_eq!(clock.deadline(), later);
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_fires_at_deadline_without_extension() {
        let start = Instant::now();
        let clock = DeadlineClock::new(Duration::from_secs(1));

        let expired = watchdog(&clock).await;

        assert_eq!(expired, start + Duration::from_secs(1));
        assert!(Instant::now() >= clock.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn extension_from_another_task_is_visible() {
        let start = Instant::now();
        let clock = std::sync::Arc::new(DeadlineClock::new(Duration::from_secs(1)));

        let extender = std::sync::Arc::clone(&clock);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            extender.extend();
        })
        .await
        .unwrap();

        assert_eq!(clock.deadline(), start + Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_rearms_after_extension() {
        let start = Instant::now();
        let clock = DeadlineClock::new(Duration::from_secs(1));

        let extender = async {
            for _ in 0..3 {
                tokio::time::sleep(Duration::from_millis(400)).await;
                clock.extend();
            }
        };

        let ((), expired) = tokio::join!(extender, watchdog(&clock));

        // Last extension at 1.2s pushes the deadline to 2.2s.
        assert!(expired >= start + Duration::from_millis(2200));
        assert!(expired < start + Duration::from_millis(2300));
        assert!(Instant::now() >= expired);
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_fires_when_extensions_stop_short() {
        let start = Instant::now();
        let clock = DeadlineClock::new(Duration::from_millis(100));

        let extender = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            clock.extend();
            // Stall for longer than the window.
            tokio::time::sleep(Duration::from_secs(10)).await;
        };

        let expired = tokio::select! {
            _ = extender => panic!("extender should not finish first"),
            expired = watchdog(&clock) => expired,
        };

        assert!(expired >= start + Duration::from_millis(150));
        assert!(expired < start + Duration::from_millis(200));
    }

    proptest! {
        #[test]
        fn deadline_is_running_max_of_extensions(
            offsets in prop::collection::vec(0u64..10_000, 1..32),
            timeout_ms in 1u64..5_000,
        ) {
            let base = Instant::now();
            let timeout = Duration::from_millis(timeout_ms);
            let clock = DeadlineClock::starting_at(base, timeout);

            let mut expected = base + timeout;
            for offset in offsets {
                let before = clock.deadline();
                let after = clock.extend_from(base + Duration::from_millis(offset));
                expected = expected.max(base + Duration::from_millis(offset) + timeout);

                prop_assert!(after >= before);
                prop_assert_eq!(after, expected);
            }
        }
    }
}
