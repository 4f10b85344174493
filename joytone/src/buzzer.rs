use embedded_hal::blocking::delay::DelayMs;
use fixed::types::U8F8;
use fugit::HertzU32;

use crate::consts::{BEEP_GAP, PWM_CLOCK_DIVIDER};
use crate::io::{PwmOutput, ToneOutput};
use crate::melody::Melody;

/// PWM counter top for a square wave of `frequency` after dividing `system_clock` by
/// `divider`. Saturates at the 16 bit counter range, so 0 Hz and very low pitches give 65535.
pub fn calculate_wrap(frequency: u32, divider: U8F8, system_clock: HertzU32) -> u16 {
    // Work in 1/256ths of a divider step to stay integer.
    let denominator = frequency as u64 * divider.to_bits() as u64;
    if denominator == 0 {
        return u16::MAX;
    }

    let counts = (system_clock.to_Hz() as u64) << 8;
    let wrap = (counts / denominator).saturating_sub(1);

    wrap.min(u16::MAX as u64) as u16
}

/// Passive buzzer on one PWM channel.
pub struct Buzzer<PWM, D> {
    pwm: PWM,
    delay: D,
    divider: U8F8,
    system_clock: HertzU32,
}

impl<PWM: PwmOutput, D: DelayMs<u32>> Buzzer<PWM, D> {
    pub fn new(mut pwm: PWM, delay: D, system_clock: HertzU32) -> Self {
        pwm.set_clock_divider(PWM_CLOCK_DIVIDER);
        pwm.set_level(0);
        pwm.set_enabled(true);

        Self {
            pwm,
            delay,
            divider: PWM_CLOCK_DIVIDER,
            system_clock,
        }
    }

    pub fn divider(&self) -> U8F8 {
        self.divider
    }

    /// Starts a 50% duty square wave and returns immediately.
    pub fn start_tone(&mut self, frequency: u32) {
        self.start_tone_with_divider(frequency, self.divider);
    }

    fn start_tone_with_divider(&mut self, frequency: u32, divider: U8F8) {
        let wrap = calculate_wrap(frequency, divider, self.system_clock);

        self.pwm.set_wrap(wrap);
        self.pwm.set_clock_divider(divider);
        self.pwm.set_level(wrap / 2);
        self.pwm.set_enabled(true);
    }

    pub fn silence(&mut self) {
        self.pwm.set_level(0);
    }

    pub fn play_tone(&mut self, frequency: u32, duration_ms: u32) {
        self.play_tone_with_divider(frequency, duration_ms, self.divider);
    }

    pub fn play_tone_with_divider(&mut self, frequency: u32, duration_ms: u32, divider: U8F8) {
        self.start_tone_with_divider(frequency, divider);
        self.delay.delay_ms(duration_ms);
        self.silence();
    }

    /// Plays the whole melody before returning. Rests just wait.
    pub fn play_melody(&mut self, melody: &Melody, divider: U8F8) {
        log::info!("playing {} ({} ms)", melody.name(), melody.total_duration_ms());

        for note in melody.notes() {
            if note.is_rest() {
                self.delay.delay_ms(note.duration_ms);
            } else {
                self.play_tone_with_divider(note.frequency as u32, note.duration_ms, divider);
            }
        }
    }

    /// `repetitions` tones, each followed by a fixed gap.
    pub fn beep(&mut self, frequency: u32, duration_ms: u32, repetitions: u32) {
        for _ in 0..repetitions {
            self.play_tone(frequency, duration_ms);
            self.delay.delay_ms(BEEP_GAP.to_millis());
        }
    }

    pub fn release(self) -> (PWM, D) {
        (self.pwm, self.delay)
    }
}

impl<PWM: PwmOutput, D: DelayMs<u32>> ToneOutput for Buzzer<PWM, D> {
    fn play_tone(&mut self, frequency: u32, duration_ms: u32) {
        Buzzer::play_tone(self, frequency, duration_ms);
    }

    fn silence(&mut self) {
        Buzzer::silence(self);
    }
}
