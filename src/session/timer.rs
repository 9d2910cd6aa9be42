use std::sync::Arc;

use time::OffsetDateTime;

/// Remaining time at or below this many seconds is shown as urgent.
pub const URGENT_THRESHOLD_SECONDS: i64 = 300;

/// Wall-clock source for the countdown.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub remaining_seconds: i64,
    /// True on exactly one tick: the first one that sees zero remaining.
    pub expired: bool,
}

/// Counts down to a fixed end instant. Expiry is latched so it is reported once.
pub struct CountdownTimer {
    end: OffsetDateTime,
    clock: Arc<dyn Clock>,
    expiry_reported: bool,
}

impl CountdownTimer {
    pub fn new(end: OffsetDateTime, clock: Arc<dyn Clock>) -> Self {
        Self { end, clock, expiry_reported: false }
    }

    pub fn end(&self) -> OffsetDateTime {
        self.end
    }

    /// `floor((end - now) / 1s)`, never negative.
    pub fn remaining_seconds(&self) -> i64 {
        let millis = (self.end - self.clock.now()).whole_milliseconds();
        if millis <= 0 {
            0
        } else {
            i64::try_from(millis / 1000).unwrap_or(i64::MAX)
        }
    }

    pub fn tick(&mut self) -> TimerTick {
        let remaining_seconds = self.remaining_seconds();
        let expired = remaining_seconds == 0 && !self.expiry_reported;
        if expired {
            self.expiry_reported = true;
        }
        TimerTick { remaining_seconds, expired }
    }

    pub fn expiry_reported(&self) -> bool {
        self.expiry_reported
    }

    /// Re-opens the expiry latch so a lapsed deadline is reported again on the next tick.
    pub fn rearm(&mut self) {
        self.expiry_reported = false;
    }
}

/// Renders seconds as `HH:MM:SS`. Hours are not wrapped.
pub fn format_remaining(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60)
}

pub fn is_urgent(seconds: i64) -> bool {
    seconds <= URGENT_THRESHOLD_SECONDS
}
