//! The polling loop. An interface takes ownership of the player's hardware and of the press
//! flags the GPIO interrupt sets. Each `run` is one cycle: handle presses, advance playback,
//! report status, sleep.

use core::fmt::Write;

use heapless::String;

use crate::consts::PlayerSettings;
use crate::io::{AnalogInput, Clock, Console, GpioBank, ToneOutput};
use crate::irq::InputFlags;
use crate::joystick::Joystick;
use crate::player::Player;
use crate::status::{Status, StatusReporter};

pub trait Interface {
    /// One cycle of the loop.
    fn run(&mut self);

    fn start(mut self) -> !
    where
        Self: Sized,
    {
        loop {
            self.run();
        }
    }
}

pub const BANNER: [&str; 4] = [
    "joytone: joystick melody player",
    "  A: next melody",
    "  B: play / pause",
    "  joystick X: pitch bend",
];

pub struct MelodyInterface<TONE, CLOCK, ADC, GPIO, CONSOLE> {
    flags: &'static InputFlags,
    player: Player,
    joystick: Joystick<ADC, GPIO>,
    tone: TONE,
    clock: CLOCK,
    console: CONSOLE,
    reporter: StatusReporter,
    settings: PlayerSettings,
}

impl<TONE, CLOCK, ADC, GPIO, CONSOLE> MelodyInterface<TONE, CLOCK, ADC, GPIO, CONSOLE>
where
    TONE: ToneOutput,
    CLOCK: Clock,
    ADC: AnalogInput,
    GPIO: GpioBank,
    CONSOLE: Console,
{
    pub fn new(
        flags: &'static InputFlags,
        player: Player,
        joystick: Joystick<ADC, GPIO>,
        tone: TONE,
        clock: CLOCK,
        mut console: CONSOLE,
    ) -> Self {
        let settings = *player.settings();

        for line in BANNER {
            console.write_line(line);
        }

        Self {
            flags,
            player,
            joystick,
            tone,
            clock,
            console,
            reporter: StatusReporter::new(settings.status_interval),
            settings,
        }
    }

    fn handle_input(&mut self) {
        if self.flags.next_melody.take() {
            self.player.next_melody();

            let mut line: String<64> = String::new();
            write!(line, "Selected melody: {}", self.player.melody().name()).ok();
            self.console.write_line(&line);
        }

        if self.flags.play_pause.take() {
            self.player.toggle_play();
        }
    }

    fn show_status(&mut self) {
        if !self.reporter.poll(self.clock.now()) {
            return;
        }

        let reading = self.joystick.read();
        let status = Status {
            x: reading.x,
            y: reading.y,
            frequency: self.player.current_freq(),
        };

        let mut line: String<64> = String::new();
        write!(line, "{}", status).ok();
        self.console.write_line(&line);
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn tone(&self) -> &TONE {
        &self.tone
    }

    pub fn console(&self) -> &CONSOLE {
        &self.console
    }
}

impl<TONE, CLOCK, ADC, GPIO, CONSOLE> Interface for MelodyInterface<TONE, CLOCK, ADC, GPIO, CONSOLE>
where
    TONE: ToneOutput,
    CLOCK: Clock,
    ADC: AnalogInput,
    GPIO: GpioBank,
    CONSOLE: Console,
{
    fn run(&mut self) {
        self.handle_input();
        self.player
            .update(&mut self.joystick, &mut self.tone, &mut self.clock);
        self.show_status();
        self.clock.delay_ms(self.settings.poll_interval.to_millis());
    }
}
