use crate::io::{Duration, Instant};

/// Time-window debouncer: after an accepted trigger, everything within `window` is vetoed.
/// Vetoed triggers do not extend the window.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    pub fn check(&self, now: Instant) -> Result<(), DebounceError> {
        let Some(last) = self.last_accepted else {
            return Ok(());
        };

        // A timestamp from before the last accepted trigger can only come from a
        // misbehaving clock; treat it as a bounce.
        let elapsed = now
            .checked_duration_since(last)
            .unwrap_or(Duration::from_ticks(0));

        if elapsed < self.window {
            Err(DebounceError::WithinWindow {
                remaining_us: (self.window - elapsed).to_micros(),
            })
        } else {
            Ok(())
        }
    }

    /// Returns whether the trigger at `now` passes, and if so remembers it.
    pub fn accept(&mut self, now: Instant) -> bool {
        match self.check(now) {
            Ok(()) => {
                self.last_accepted = Some(now);
                true
            }
            Err(_) => false,
        }
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceError {
    WithinWindow { remaining_us: u64 },
}
