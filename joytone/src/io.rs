//! The hardware the core needs, as traits. The rp2040 firmware implements these with the HAL,
//! the simulator with the terminal.

use embedded_hal::blocking::delay::DelayMs;
use fixed::types::U8F8;

use crate::irq::EventMask;

/// Timestamp with microsecond ticks, the same type as the RP2040 timer counter.
pub type Instant = fugit::TimerInstantU64<1_000_000>;
pub type Duration = fugit::TimerDurationU64<1_000_000>;

pub trait GpioBank {
    fn configure_pull_up_input(&mut self, pin: u8);
    fn is_high(&mut self, pin: u8) -> bool;
    fn set_irq_enabled(&mut self, pin: u8, events: EventMask, enabled: bool);
    /// Route the bank interrupt to the dispatch layer. Called more than once.
    fn enable_bank_irq(&mut self);
}

pub trait AnalogInput {
    fn configure_channel(&mut self, channel: u8);
    fn select_channel(&mut self, channel: u8);
    /// Blocking conversion on the selected channel.
    fn read(&mut self) -> u16;
}

pub trait PwmOutput {
    fn set_wrap(&mut self, wrap: u16);
    fn set_clock_divider(&mut self, divider: U8F8);
    fn set_level(&mut self, level: u16);
    fn set_enabled(&mut self, enabled: bool);
}

/// Monotonic clock that can also block the caller.
pub trait Clock: DelayMs<u32> {
    fn now(&self) -> Instant;

    fn deadline_in(&self, ms: u32) -> Instant {
        self.now() + Duration::millis(ms as u64)
    }

    fn reached(&self, deadline: Instant) -> bool {
        self.now() >= deadline
    }

    fn elapsed_us(&self, since: Instant) -> u64 {
        self.now()
            .checked_duration_since(since)
            .map(|elapsed| elapsed.to_micros())
            .unwrap_or(0)
    }
}

pub trait ToneOutput {
    /// Sound `frequency` for `duration_ms`, returning once the tone is over.
    fn play_tone(&mut self, frequency: u32, duration_ms: u32);
    fn silence(&mut self);
}

pub trait Console {
    fn write_line(&mut self, line: &str);
}
