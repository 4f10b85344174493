//! GPIO interrupt dispatch.
//!
//! A fixed table, indexed by pin number, of callbacks to run when a pin's interrupt fires.
//! Every pin gets its own [`Debouncer`]; presses that come in too fast after the last
//! accepted one never reach the callback.
//!
//! The table is shared between the interrupt vector and the main loop, so it sits behind a
//! critical section. Callbacks run in interrupt context: keep them to setting a flag.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;
use critical_section::Mutex;

use crate::consts::{DEBOUNCE_WINDOW, MAX_GPIO_PINS};
use crate::debouncer::Debouncer;
use crate::io::{Duration, GpioBank, Instant};

bitflags! {
    /// GPIO interrupt event kinds, bit compatible with the RP2040's per-pin event fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventMask: u8 {
        const LEVEL_LOW = 0b0001;
        const LEVEL_HIGH = 0b0010;
        const EDGE_FALL = 0b0100;
        const EDGE_RISE = 0b1000;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EventMask {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "EventMask({=u8:#b})", self.bits())
    }
}

/// Something to invoke when an interrupt passes the debouncer.
pub trait IrqCallback: Sync {
    fn call(&self);
}

impl<F: Fn() + Sync> IrqCallback for F {
    fn call(&self) {
        self()
    }
}

#[derive(Clone, Copy)]
struct Slot {
    callback: Option<&'static dyn IrqCallback>,
    events: EventMask,
    debouncer: Debouncer,
}

impl Slot {
    const fn empty(window: Duration) -> Self {
        Self {
            callback: None,
            events: EventMask::empty(),
            debouncer: Debouncer::new(window),
        }
    }
}

pub struct IrqDispatcher<const N: usize = MAX_GPIO_PINS> {
    slots: Mutex<RefCell<[Slot; N]>>,
    initialized: AtomicBool,
}

impl<const N: usize> IrqDispatcher<N> {
    pub const fn new() -> Self {
        Self::with_debounce_window(DEBOUNCE_WINDOW)
    }

    pub const fn with_debounce_window(window: Duration) -> Self {
        Self {
            slots: Mutex::new(RefCell::new([Slot::empty(window); N])),
            initialized: AtomicBool::new(false),
        }
    }

    /// Hooks the bank interrupt up. Every button calls this, only the first call does anything.
    pub fn init<G: GpioBank>(&self, gpio: &mut G) {
        if self.initialized.load(Ordering::Acquire) {
            return;
        }

        gpio.enable_bank_irq();
        self.initialized.store(true, Ordering::Release);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Stores `callback` for `pin`, replacing whatever was there, and enables `events` on it.
    /// Pins outside the table are ignored.
    pub fn register<G: GpioBank>(
        &self,
        gpio: &mut G,
        pin: u8,
        callback: &'static dyn IrqCallback,
        events: EventMask,
    ) {
        let index = pin as usize;
        if index >= N {
            return;
        }

        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            slots[index].callback = Some(callback);
            slots[index].events = events;
        });

        gpio.set_irq_enabled(pin, events, true);
    }

    pub fn remove<G: GpioBank>(&self, gpio: &mut G, pin: u8, events: EventMask) {
        let index = pin as usize;
        if index >= N {
            return;
        }

        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            slots[index].callback = None;
            slots[index].events = EventMask::empty();
        });

        gpio.set_irq_enabled(pin, events, false);
    }

    pub fn is_registered(&self, pin: u8) -> bool {
        let index = pin as usize;
        if index >= N {
            return false;
        }

        critical_section::with(|cs| self.slots.borrow_ref(cs)[index].callback.is_some())
    }

    /// Entry point for the interrupt vector. Runs the pin's callback unless the pin is
    /// unknown, the events don't match the registration, or the debouncer vetoes it.
    pub fn dispatch(&self, pin: u8, events: EventMask, now: Instant) {
        let index = pin as usize;
        if index >= N {
            return;
        }

        let callback = critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let slot = &mut slots[index];

            let callback = slot.callback?;
            if !slot.events.intersects(events) {
                return None;
            }

            slot.debouncer.accept(now).then_some(callback)
        });

        if let Some(callback) = callback {
            callback.call();
        }
    }

    pub fn last_trigger(&self, pin: u8) -> Option<Instant> {
        let index = pin as usize;
        if index >= N {
            return None;
        }

        critical_section::with(|cs| self.slots.borrow_ref(cs)[index].debouncer.last_accepted())
    }
}

impl<const N: usize> Default for IrqDispatcher<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sticky flag for a button press: set from the interrupt, taken by the main loop.
/// Only loads and stores, the Cortex-M0+ has no atomic swap.
pub struct PressFlag(AtomicBool);

impl PressFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns whether the flag was set, clearing it.
    pub fn take(&self) -> bool {
        if self.0.load(Ordering::Acquire) {
            self.0.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}

impl Default for PressFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqCallback for PressFlag {
    fn call(&self) {
        self.set();
    }
}

/// The two presses the player reacts to.
pub struct InputFlags {
    pub next_melody: PressFlag,
    pub play_pause: PressFlag,
}

impl InputFlags {
    pub const fn new() -> Self {
        Self {
            next_melody: PressFlag::new(),
            play_pause: PressFlag::new(),
        }
    }
}

impl Default for InputFlags {
    fn default() -> Self {
        Self::new()
    }
}
