use core::fmt;

use crate::io::{Duration, Instant};

/// What the console line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub x: u16,
    pub y: u16,
    pub frequency: u32,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X: {:<4} | Y: {:<4} | Freq: {:<4} Hz",
            self.x, self.y, self.frequency
        )
    }
}

/// Limits status output to once per interval.
#[derive(Debug, Clone, Copy)]
pub struct StatusReporter {
    interval: Duration,
    next_at: Option<Instant>,
}

impl StatusReporter {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_at: None,
        }
    }

    /// True if a line is due at `now`; the next one is then due an interval later.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_at {
            Some(next) if now < next => false,
            _ => {
                self.next_at = Some(now + self.interval);
                true
            }
        }
    }
}
