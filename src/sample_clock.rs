//! Sampling scheduler: turns the fixed-period tick into a one-shot "sample
//! due" signal. The flag is the only state shared between the tick context
//! and the main loop, so set and consume must both be indivisible.

use embassy_time::{Duration, Ticker};
use portable_atomic::{AtomicBool, Ordering};

/// Fixed sample period, set once at startup and never renegotiated.
pub static SAMPLE_INTERVAL_MILLIS: u32 = 16;

/// One-shot sample signal. Raised from tick context, consumed from the main
/// loop. Re-raising while already due is idempotent; missed laps are not
/// counted and never caught up.
pub struct SampleFlag {
    due: AtomicBool,
}

impl SampleFlag {
    pub const fn new() -> Self {
        Self {
            due: AtomicBool::new(false),
        }
    }

    /// Mark a sample due. Tick-context side.
    pub fn raise(&self) {
        self.due.store(true, Ordering::SeqCst);
    }

    /// Consume the signal. The swap is atomic with respect to a concurrent
    /// `raise`, so a tick landing mid-consume shows up on the next check.
    pub fn take(&self) -> bool {
        self.due.swap(false, Ordering::SeqCst)
    }

    /// Non-consuming check.
    pub fn is_due(&self) -> bool {
        self.due.load(Ordering::SeqCst)
    }
}

impl Default for SampleFlag {
    fn default() -> Self {
        Self::new()
    }
}

pub static SAMPLE_FLAG: SampleFlag = SampleFlag::new();

/// Periodic tick source. `Ticker` re-arms itself every lap, so firing
/// continues for as long as the executor runs.
#[embassy_executor::task]
pub async fn sample_tick_task() -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MILLIS.into()));
    loop {
        ticker.next().await;
        SAMPLE_FLAG.raise();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_the_signal() {
        let flag = SampleFlag::new();
        assert!(!flag.take());
        flag.raise();
        assert!(flag.is_due());
        assert!(flag.take());
        assert!(!flag.is_due());
        assert!(!flag.take());
    }

    #[test]
    fn raise_is_idempotent() {
        let flag = SampleFlag::new();
        flag.raise();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        // No queued count: a single take drains all coalesced ticks.
        assert!(!flag.take());
    }

    #[test]
    fn concurrent_raise_is_never_lost() {
        use std::sync::atomic::{AtomicU32, Ordering as StdOrdering};

        static FLAG: SampleFlag = SampleFlag::new();
        static RAISES: AtomicU32 = AtomicU32::new(0);

        let ticker = std::thread::spawn(|| {
            for _ in 0..10_000 {
                FLAG.raise();
                RAISES.fetch_add(1, StdOrdering::SeqCst);
            }
        });

        let mut taken = 0u32;
        while !ticker.is_finished() {
            if FLAG.take() {
                taken += 1;
            }
        }
        ticker.join().unwrap();

        // Drain whatever the last raise left behind.
        if FLAG.take() {
            taken += 1;
        }
        assert!(taken >= 1);
        assert!(!FLAG.is_due());
        assert!(taken <= RAISES.load(StdOrdering::SeqCst));
    }
}
