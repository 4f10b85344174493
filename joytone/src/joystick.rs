use crate::consts::{JOYSTICK_X_CHANNEL, JOYSTICK_Y_CHANNEL};
use crate::io::{AnalogInput, GpioBank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickReading {
    pub x: u16,
    pub y: u16,
    /// True while the stick is pushed in.
    pub button: bool,
}

/// Two-axis analog stick with a push button. X is on ADC channel 0, Y on channel 1.
pub struct Joystick<ADC, G> {
    adc: ADC,
    gpio: G,
    button_pin: u8,
}

impl<ADC: AnalogInput, G: GpioBank> Joystick<ADC, G> {
    pub fn new(mut adc: ADC, mut gpio: G, button_pin: u8) -> Self {
        adc.configure_channel(JOYSTICK_X_CHANNEL);
        adc.configure_channel(JOYSTICK_Y_CHANNEL);
        gpio.configure_pull_up_input(button_pin);

        Self {
            adc,
            gpio,
            button_pin,
        }
    }

    pub fn read_x(&mut self) -> u16 {
        self.adc.select_channel(JOYSTICK_X_CHANNEL);
        self.adc.read()
    }

    pub fn read_y(&mut self) -> u16 {
        self.adc.select_channel(JOYSTICK_Y_CHANNEL);
        self.adc.read()
    }

    pub fn read_button(&mut self) -> bool {
        !self.gpio.is_high(self.button_pin)
    }

    pub fn read(&mut self) -> JoystickReading {
        let x = self.read_x();
        let y = self.read_y();
        let button = self.read_button();

        JoystickReading { x, y, button }
    }

    pub fn release(self) -> (ADC, G) {
        (self.adc, self.gpio)
    }
}

/// Linear rescale of `value` from `[in_min, in_max]` to `[out_min, out_max]`, truncating.
/// Values outside the input range extrapolate. An empty input range maps everything to
/// `out_min`.
pub fn map_value(value: u16, in_min: u16, in_max: u16, out_min: i16, out_max: i16) -> i16 {
    let span_in = in_max as i64 - in_min as i64;
    if span_in == 0 {
        return out_min;
    }

    let span_out = out_max as i64 - out_min as i64;
    let mapped = (value as i64 - in_min as i64) * span_out / span_in + out_min as i64;

    mapped.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}
