//! Interruptible countdowns.
//!
//! Every waiting state of the orchestrator goes through [`countdown`]: the wait
//! is split into one-second ticks, the pause token is checked before each tick,
//! and the remaining seconds are handed to an observer so a countdown can be
//! displayed.

use std::time::Duration;

use rand::Rng;

use crate::control::PauseFlag;

/// Checkpoint granularity of every wait.
pub const TICK: Duration = Duration::from_secs(1);

/// How a countdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration elapsed.
    Elapsed,
    /// Pause was requested; `remaining_secs` were still left.
    Interrupted { remaining_secs: u64 },
}

impl SleepOutcome {
    pub fn is_interrupted(self) -> bool {
        matches!(self, SleepOutcome::Interrupted { .. })
    }
}

/// Sleep `secs` seconds in one-second ticks.
///
/// `on_tick` receives the remaining seconds before each tick (`secs`, `secs - 1`,
/// ..., `1`). A zero-length countdown returns `Elapsed` immediately, unless pause
/// is already requested.
pub async fn countdown<F>(secs: u64, pause: &PauseFlag, mut on_tick: F) -> SleepOutcome
where
    F: FnMut(u64),
{
    let mut remaining = secs;
    loop {
        if pause.is_requested() {
            return SleepOutcome::Interrupted {
                remaining_secs: remaining,
            };
        }
        if remaining == 0 {
            return SleepOutcome::Elapsed;
        }
        on_tick(remaining);
        tokio::time::sleep(TICK).await;
        remaining -= 1;
    }
}

/// Uniform random whole seconds in `[min, max]` (bounds may be given in either order).
pub fn random_secs(min: u64, max: u64) -> u64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo == hi {
        return lo;
    }
    rand::thread_rng().gen_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn countdown_reports_every_second_and_elapses() {
        let pause = PauseFlag::new();
        let mut seen = Vec::new();
        let start = tokio::time::Instant::now();
        let outcome = countdown(3, &pause, |r| seen.push(r)).await;
        assert_eq!(outcome, SleepOutcome::Elapsed);
        assert_eq!(seen, vec![3, 2, 1]);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_stops_within_one_tick_of_pause() {
        let pause = PauseFlag::new();
        let trigger = pause.clone();
        let outcome = countdown(10, &pause, |r| {
            if r == 7 {
                trigger.request();
            }
        })
        .await;
        assert_eq!(outcome, SleepOutcome::Interrupted { remaining_secs: 6 });
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_zero_respects_pending_pause() {
        let pause = PauseFlag::new();
        assert_eq!(countdown(0, &pause, |_| {}).await, SleepOutcome::Elapsed);
        pause.request();
        assert!(countdown(0, &pause, |_| {}).await.is_interrupted());
    }

    #[test]
    fn random_secs_stays_in_bounds() {
        for _ in 0..200 {
            let s = random_secs(5, 10);
            assert!((5..=10).contains(&s));
        }
        assert_eq!(random_secs(4, 4), 4);
        let swapped = random_secs(220, 160);
        assert!((160..=220).contains(&swapped));
    }
}
