//! An injectable clock for the root-fetch retry sleep, so tests don't have
//! to actually wait out the real delay.

use std::time::Duration;

pub trait Clock {
    fn sleep(&self, dur: Duration);
}

/// The real clock, used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, dur: Duration) {
        std::thread::sleep(dur);
    }
}
