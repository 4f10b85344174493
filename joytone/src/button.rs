use crate::irq::{EventMask, IrqCallback, IrqDispatcher};
use crate::io::GpioBank;

/// Active-low push button on a pulled-up input.
#[derive(Debug, Clone, Copy)]
pub struct Button {
    pin: u8,
    last_state: bool,
}

impl Button {
    pub fn new<G: GpioBank>(gpio: &mut G, pin: u8) -> Self {
        gpio.configure_pull_up_input(pin);
        let last_state = gpio.is_high(pin);

        Self { pin, last_state }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Level sampled at construction. Not updated afterwards.
    pub fn last_state(&self) -> bool {
        self.last_state
    }

    pub fn is_pressed<G: GpioBank>(&self, gpio: &mut G) -> bool {
        !gpio.is_high(self.pin)
    }

    /// Runs `callback` on every debounced press (falling edge).
    pub fn attach_callback<G: GpioBank, const N: usize>(
        &self,
        dispatcher: &IrqDispatcher<N>,
        gpio: &mut G,
        callback: &'static dyn IrqCallback,
    ) {
        dispatcher.init(gpio);
        dispatcher.register(gpio, self.pin, callback, EventMask::EDGE_FALL);
        log::debug!("button on GPIO{} wired to falling edge", self.pin);
    }

    pub fn detach_callback<G: GpioBank, const N: usize>(
        &self,
        dispatcher: &IrqDispatcher<N>,
        gpio: &mut G,
    ) {
        dispatcher.remove(gpio, self.pin, EventMask::EDGE_FALL);
    }
}
