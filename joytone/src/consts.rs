use fixed::types::U8F8;
use fugit::{HertzU32, MillisDurationU32};

use crate::io::Duration;

pub const SYSTEM_CLOCK_HZ: HertzU32 = HertzU32::from_raw(125_000_000u32);

/// Number of user GPIOs on the RP2040, and so the size of the interrupt dispatch table.
pub const MAX_GPIO_PINS: usize = 30;

pub const BUTTON_A_PIN: u8 = 5;
pub const BUTTON_B_PIN: u8 = 6;
pub const BUZZER_PIN: u8 = 21;
pub const JOYSTICK_BUTTON_PIN: u8 = 22;
pub const JOYSTICK_X_PIN: u8 = 26; // ADC0
pub const JOYSTICK_Y_PIN: u8 = 27; // ADC1

pub const JOYSTICK_X_CHANNEL: u8 = 0;
pub const JOYSTICK_Y_CHANNEL: u8 = 1;

/// Highest value the 12 bit ADC can return.
pub const ADC_FULL_SCALE: u16 = 4095;

pub const DEBOUNCE_WINDOW: Duration = Duration::millis(200);
pub const POLL_INTERVAL: MillisDurationU32 = MillisDurationU32::from_ticks(10);
pub const STATUS_INTERVAL: Duration = Duration::millis(100);
pub const BEEP_GAP: MillisDurationU32 = MillisDurationU32::from_ticks(500);

pub const PWM_CLOCK_DIVIDER: U8F8 = U8F8::from_bits(125 << 8);

/// Runtime knobs of the player and its polling loop. The defaults match the board.
#[derive(Debug, Clone, Copy)]
pub struct PlayerSettings {
    pub adc_full_scale: u16,
    pub poll_interval: MillisDurationU32,
    pub status_interval: Duration,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            adc_full_scale: ADC_FULL_SCALE,
            poll_interval: POLL_INTERVAL,
            status_interval: STATUS_INTERVAL,
        }
    }
}
