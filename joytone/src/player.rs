//! Playback state machine.
//!
//! Paced by a deadline per note on the monotonic clock, driven by calling [`Player::update`]
//! from the polling loop. The note itself is emitted with a blocking call, so one `update`
//! can take as long as the longest note.

use crate::consts::PlayerSettings;
use crate::io::{AnalogInput, Clock, Duration, GpioBank, Instant, ToneOutput};
use crate::joystick::Joystick;
use crate::melody::Melody;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    Paused,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerError {
    EmptyCatalog,
}

pub struct Player {
    catalog: &'static [Melody],
    selected: usize,
    current_note: usize,
    state: PlaybackState,
    /// `None` means the next note is due right away.
    next_note_at: Option<Instant>,
    freq_mult: f32,
    current_freq: u32,
    settings: PlayerSettings,
}

impl Player {
    pub fn new(catalog: &'static [Melody], settings: PlayerSettings) -> Result<Self, PlayerError> {
        if catalog.is_empty() {
            return Err(PlayerError::EmptyCatalog);
        }

        Ok(Self {
            catalog,
            selected: 0,
            current_note: 0,
            state: PlaybackState::Paused,
            next_note_at: None,
            freq_mult: 1.0,
            current_freq: 0,
            settings,
        })
    }

    /// Selects the next melody in the catalog, wrapping around, and stops playback.
    pub fn next_melody(&mut self) {
        self.selected = (self.selected + 1) % self.catalog.len();
        self.state = PlaybackState::Paused;
        self.rewind();

        log::info!("selected melody {}: {}", self.selected, self.melody().name());
    }

    /// Starts or stops playback. Either way the melody starts over from its first note.
    pub fn toggle_play(&mut self) {
        self.state = match self.state {
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Playing => PlaybackState::Paused,
        };
        self.rewind();

        log::info!("{:?} {}", self.state, self.melody().name());
    }

    fn rewind(&mut self) {
        self.current_note = 0;
        self.next_note_at = None;
    }

    /// One step of the state machine; call once per polling cycle.
    pub fn update<ADC, G, TONE, CLOCK>(
        &mut self,
        joystick: &mut Joystick<ADC, G>,
        tone: &mut TONE,
        clock: &mut CLOCK,
    ) where
        ADC: AnalogInput,
        G: GpioBank,
        TONE: ToneOutput,
        CLOCK: Clock,
    {
        if self.state == PlaybackState::Paused {
            tone.silence();
            return;
        }

        let x = joystick.read_x();
        self.freq_mult = 0.5 + x as f32 / self.settings.adc_full_scale as f32;

        if let Some(deadline) = self.next_note_at {
            if !clock.reached(deadline) {
                return;
            }
        }

        let melody = self.melody();
        let Some(note) = melody.note(self.current_note) else {
            // End of the melody. The note index stays where it is until the next toggle.
            self.state = PlaybackState::Paused;
            log::info!("finished {}", melody.name());
            return;
        };

        let start = clock.now();

        if note.is_rest() {
            self.current_freq = 0;
            log::debug!("note {}: rest {} ms", self.current_note, note.duration_ms);
            clock.delay_ms(note.duration_ms);
        } else {
            let frequency = libm::roundf(note.frequency as f32 * self.freq_mult) as u32;
            self.current_freq = frequency;
            log::debug!(
                "note {}: {} Hz ({} x {}) {} ms",
                self.current_note,
                frequency,
                note.frequency,
                self.freq_mult,
                note.duration_ms
            );
            tone.play_tone(frequency, note.duration_ms);
        }

        self.current_note += 1;
        // Anchored at the note start: the blocking emission above already used up the
        // duration, so the next note is due on the following cycle.
        self.next_note_at = Some(start + Duration::millis(note.duration_ms as u64));
    }

    pub fn melody(&self) -> &'static Melody {
        let catalog = self.catalog;
        &catalog[self.selected]
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn current_note(&self) -> usize {
        self.current_note
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn freq_mult(&self) -> f32 {
        self.freq_mult
    }

    /// Last frequency sent to the buzzer, 0 during rests.
    pub fn current_freq(&self) -> u32 {
        self.current_freq
    }

    pub fn next_note_at(&self) -> Option<Instant> {
        self.next_note_at
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }
}
