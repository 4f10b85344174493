use core::cell::RefCell;

use cortex_m::interrupt::Mutex;
use defmt::*;
use embedded_hal::adc::OneShot;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use embedded_hal::PwmPin;
use fixed::types::U8F8;
use heapless::Vec;
use rp_pico::hal::{
    adc::AdcPin,
    gpio::{DynPinId, FunctionNull, FunctionSioInput, Interrupt, Pin, PullNone, PullUp},
    pac,
    pwm::{FreeRunning, Pwm2, Slice},
    Adc, Timer,
};

use joytone::io::{AnalogInput, Clock, Console, GpioBank, Instant, PwmOutput};
use joytone::irq::EventMask;

pub type InputPinDyn = Pin<DynPinId, FunctionSioInput, PullUp>;

/// Pins the firmware takes interrupts on or reads digitally: button A, button B and the
/// joystick press.
pub const DIGITAL_PINS: usize = 3;

const EVENTS: [(EventMask, Interrupt); 4] = [
    (EventMask::LEVEL_LOW, Interrupt::LevelLow),
    (EventMask::LEVEL_HIGH, Interrupt::LevelHigh),
    (EventMask::EDGE_FALL, Interrupt::EdgeLow),
    (EventMask::EDGE_RISE, Interrupt::EdgeHigh),
];

pub struct PicoGpio {
    pins: [InputPinDyn; DIGITAL_PINS],
}

impl PicoGpio {
    pub fn new(pins: [InputPinDyn; DIGITAL_PINS]) -> Self {
        Self { pins }
    }

    fn pin(&mut self, num: u8) -> Option<&mut InputPinDyn> {
        self.pins.iter_mut().find(|pin| pin.id().num == num)
    }

    /// Collects and acknowledges every pending GPIO event. Called from `IO_IRQ_BANK0`.
    pub fn take_pending(&mut self) -> Vec<(u8, EventMask), DIGITAL_PINS> {
        let mut pending = Vec::new();

        for pin in self.pins.iter_mut() {
            let mut events = EventMask::empty();
            for (mask, interrupt) in EVENTS {
                if pin.interrupt_status(interrupt) {
                    events |= mask;
                    pin.clear_interrupt(interrupt);
                }
            }

            if !events.is_empty() {
                // Never full, there is one slot per pin.
                pending.push((pin.id().num, events)).ok();
            }
        }

        pending
    }
}

impl GpioBank for PicoGpio {
    fn configure_pull_up_input(&mut self, pin: u8) {
        // All digital pins are set up as pulled-up inputs in main.
        if self.pin(pin).is_none() {
            warn!("GPIO{} is not wired as a digital input", pin);
        }
    }

    fn is_high(&mut self, pin: u8) -> bool {
        match self.pin(pin) {
            Some(pin) => InputPin::is_high(pin).unwrap_or(true),
            None => true,
        }
    }

    fn set_irq_enabled(&mut self, pin: u8, events: EventMask, enabled: bool) {
        let Some(pin) = self.pin(pin) else {
            return;
        };

        for (mask, interrupt) in EVENTS {
            if events.contains(mask) {
                pin.set_interrupt_enabled(interrupt, enabled);
            }
        }
    }

    fn enable_bank_irq(&mut self) {
        unsafe {
            pac::NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
        }
    }
}

/// The GPIO bank is shared with the interrupt handler, so it lives in a static.
pub static GPIO: Mutex<RefCell<Option<PicoGpio>>> = Mutex::new(RefCell::new(None));

/// Handle to the [`GPIO`] static. Copy it wherever a `GpioBank` is needed.
#[derive(Clone, Copy)]
pub struct SharedGpio;

impl SharedGpio {
    fn with<R>(&self, default: R, f: impl FnOnce(&mut PicoGpio) -> R) -> R {
        cortex_m::interrupt::free(|cs| match GPIO.borrow(cs).borrow_mut().as_mut() {
            Some(gpio) => f(gpio),
            None => default,
        })
    }
}

impl GpioBank for SharedGpio {
    fn configure_pull_up_input(&mut self, pin: u8) {
        self.with((), |gpio| gpio.configure_pull_up_input(pin));
    }

    fn is_high(&mut self, pin: u8) -> bool {
        self.with(true, |gpio| gpio.is_high(pin))
    }

    fn set_irq_enabled(&mut self, pin: u8, events: EventMask, enabled: bool) {
        self.with((), |gpio| gpio.set_irq_enabled(pin, events, enabled));
    }

    fn enable_bank_irq(&mut self) {
        self.with((), |gpio| gpio.enable_bank_irq());
    }
}

pub type AnalogPin = AdcPin<Pin<DynPinId, FunctionNull, PullNone>>;

/// ADC with the two joystick axes: channel 0 on GPIO26, channel 1 on GPIO27.
pub struct PicoAdc {
    adc: Adc,
    channels: [AnalogPin; 2],
    selected: usize,
}

impl PicoAdc {
    pub fn new(adc: Adc, channels: [AnalogPin; 2]) -> Self {
        Self {
            adc,
            channels,
            selected: 0,
        }
    }
}

impl AnalogInput for PicoAdc {
    fn configure_channel(&mut self, channel: u8) {
        if channel as usize >= self.channels.len() {
            warn!("ADC channel {} is not connected", channel);
        }
    }

    fn select_channel(&mut self, channel: u8) {
        self.selected = (channel as usize).min(self.channels.len() - 1);
    }

    fn read(&mut self) -> u16 {
        let pin = &mut self.channels[self.selected];
        let sample: Result<u16, _> = self.adc.read(pin);
        sample.unwrap_or(0)
    }
}

/// PWM slice 2, the buzzer hangs off channel B (GPIO21).
pub struct PicoPwm {
    slice: Slice<Pwm2, FreeRunning>,
}

impl PicoPwm {
    pub fn new(slice: Slice<Pwm2, FreeRunning>) -> Self {
        Self { slice }
    }
}

impl PwmOutput for PicoPwm {
    fn set_wrap(&mut self, wrap: u16) {
        self.slice.set_top(wrap);
    }

    fn set_clock_divider(&mut self, divider: U8F8) {
        // The hardware divider has 4 fractional bits.
        let bits = divider.to_bits();
        self.slice.set_div_int((bits >> 8) as u8);
        self.slice.set_div_frac(((bits & 0xff) >> 4) as u8);
    }

    fn set_level(&mut self, level: u16) {
        self.slice.channel_b.set_duty(level);
    }

    fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.slice.enable();
        } else {
            self.slice.disable();
        }
    }
}

/// The 1 MHz system timer, as clock and blocking delay.
#[derive(Clone, Copy)]
pub struct PicoClock {
    timer: Timer,
}

impl PicoClock {
    pub fn new(timer: Timer) -> Self {
        Self { timer }
    }
}

impl DelayMs<u32> for PicoClock {
    fn delay_ms(&mut self, ms: u32) {
        DelayMs::<u32>::delay_ms(&mut self.timer, ms);
    }
}

impl Clock for PicoClock {
    fn now(&self) -> Instant {
        self.timer.get_counter()
    }
}

/// Console lines go out over RTT.
pub struct DefmtConsole;

impl Console for DefmtConsole {
    fn write_line(&mut self, line: &str) {
        println!("{=str}", line);
    }
}
