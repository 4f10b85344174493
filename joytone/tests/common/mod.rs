#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Once;

use embedded_hal::blocking::delay::DelayMs;
use fixed::types::U8F8;
use joytone::io::{AnalogInput, Clock, Console, GpioBank, Instant, PwmOutput, ToneOutput};
use joytone::irq::EventMask;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

/// Microseconds since boot, shared by every fake that needs to see or move time.
pub type Time = Rc<Cell<u64>>;

pub fn ms(ms: u64) -> Instant {
    Instant::from_ticks(ms * 1_000)
}

#[derive(Default)]
pub struct FakeGpio {
    pub levels: HashMap<u8, bool>,
    pub pull_ups: Vec<u8>,
    pub irq_changes: Vec<(u8, EventMask, bool)>,
    pub bank_irq_enables: usize,
}

impl FakeGpio {
    pub fn set_level(&mut self, pin: u8, high: bool) {
        self.levels.insert(pin, high);
    }
}

impl GpioBank for FakeGpio {
    fn configure_pull_up_input(&mut self, pin: u8) {
        self.pull_ups.push(pin);
    }

    fn is_high(&mut self, pin: u8) -> bool {
        // Pulled up and not pressed unless a test says otherwise.
        *self.levels.get(&pin).unwrap_or(&true)
    }

    fn set_irq_enabled(&mut self, pin: u8, events: EventMask, enabled: bool) {
        self.irq_changes.push((pin, events, enabled));
    }

    fn enable_bank_irq(&mut self) {
        self.bank_irq_enables += 1;
    }
}

pub struct FakeAdc {
    pub x: Rc<Cell<u16>>,
    pub y: u16,
    pub configured: Vec<u8>,
    pub reads: Rc<RefCell<Vec<u8>>>,
    selected: u8,
}

impl FakeAdc {
    pub fn new(x: u16, y: u16) -> Self {
        Self {
            x: Rc::new(Cell::new(x)),
            y,
            configured: Vec::new(),
            reads: Rc::new(RefCell::new(Vec::new())),
            selected: 0,
        }
    }
}

impl AnalogInput for FakeAdc {
    fn configure_channel(&mut self, channel: u8) {
        self.configured.push(channel);
    }

    fn select_channel(&mut self, channel: u8) {
        self.selected = channel;
    }

    fn read(&mut self) -> u16 {
        self.reads.borrow_mut().push(self.selected);
        match self.selected {
            0 => self.x.get(),
            _ => self.y,
        }
    }
}

pub struct FakeClock {
    pub time: Time,
    pub delays: Rc<RefCell<Vec<u32>>>,
}

impl FakeClock {
    pub fn new(time: Time) -> Self {
        Self {
            time,
            delays: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn advance_ms(&self, ms: u32) {
        self.time.set(self.time.get() + ms as u64 * 1_000);
    }
}

impl DelayMs<u32> for FakeClock {
    fn delay_ms(&mut self, ms: u32) {
        self.delays.borrow_mut().push(ms);
        self.advance_ms(ms);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.time.get())
    }
}

/// Records every tone. Blocks, like the real buzzer, by moving the shared time forward.
pub struct FakeTone {
    pub time: Time,
    pub advance: bool,
    pub emitted: Vec<(u32, u32)>,
    pub started_at_ms: Vec<u64>,
    pub silences: usize,
    /// Runs in the middle of every tone, standing in for an interrupt.
    pub during_tone: Option<Box<dyn FnMut()>>,
}

impl FakeTone {
    pub fn new(time: Time) -> Self {
        Self {
            time,
            advance: true,
            emitted: Vec::new(),
            started_at_ms: Vec::new(),
            silences: 0,
            during_tone: None,
        }
    }
}

impl ToneOutput for FakeTone {
    fn play_tone(&mut self, frequency: u32, duration_ms: u32) {
        self.emitted.push((frequency, duration_ms));
        self.started_at_ms.push(self.time.get() / 1_000);

        if let Some(hook) = self.during_tone.as_mut() {
            hook();
        }

        if self.advance {
            self.time.set(self.time.get() + duration_ms as u64 * 1_000);
        }
    }

    fn silence(&mut self) {
        self.silences += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PwmOp {
    Wrap(u16),
    Divider(U8F8),
    Level(u16),
    Enabled(bool),
}

#[derive(Default)]
pub struct FakePwm {
    pub ops: Vec<PwmOp>,
}

impl PwmOutput for FakePwm {
    fn set_wrap(&mut self, wrap: u16) {
        self.ops.push(PwmOp::Wrap(wrap));
    }

    fn set_clock_divider(&mut self, divider: U8F8) {
        self.ops.push(PwmOp::Divider(divider));
    }

    fn set_level(&mut self, level: u16) {
        self.ops.push(PwmOp::Level(level));
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.ops.push(PwmOp::Enabled(enabled));
    }
}

#[derive(Default)]
pub struct FakeDelay {
    pub delays: Vec<u32>,
}

impl DelayMs<u32> for FakeDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }
}

#[derive(Default)]
pub struct FakeConsole {
    pub lines: Rc<RefCell<Vec<String>>>,
}

impl Console for FakeConsole {
    fn write_line(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
