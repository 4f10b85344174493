use std::{
    sync::{
        atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering},
        Arc, Mutex, OnceLock,
    },
    thread,
    time::{Duration, Instant as StdInstant},
};

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};
use embedded_graphics_simulator::{
    sdl2::Keycode, BinaryColorTheme, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent,
    Window,
};
use embedded_hal::blocking::delay::DelayMs;
use env_logger::{Builder, Env};
use fixed::types::U8F8;
use log::LevelFilter;

use joytone::{
    button::Button,
    buzzer::Buzzer,
    consts::{
        PlayerSettings, ADC_FULL_SCALE, BUTTON_A_PIN, BUTTON_B_PIN, JOYSTICK_BUTTON_PIN,
        JOYSTICK_X_CHANNEL, SYSTEM_CLOCK_HZ,
    },
    interface::{Interface, MelodyInterface},
    io::{AnalogInput, Clock, Console, GpioBank, Instant, PwmOutput},
    irq::{EventMask, InputFlags, IrqDispatcher},
    joystick::Joystick,
    melody::CATALOG,
    player::Player,
};

static DISPATCHER: IrqDispatcher = IrqDispatcher::new();
static FLAGS: InputFlags = InputFlags::new();

static JOYSTICK_X: AtomicU16 = AtomicU16::new(ADC_FULL_SCALE / 2);
static JOYSTICK_Y: AtomicU16 = AtomicU16::new(ADC_FULL_SCALE / 2);
static JOYSTICK_PRESSED: AtomicBool = AtomicBool::new(false);
/// PWM top while the buzzer sounds, 0 while it is silent.
static SOUNDING_WRAP: AtomicU32 = AtomicU32::new(0);

static BOOT: OnceLock<StdInstant> = OnceLock::new();

const AXIS_STEP: u16 = 256;

fn now() -> Instant {
    let elapsed = BOOT.get_or_init(StdInstant::now).elapsed();
    Instant::from_ticks(elapsed.as_micros() as u64)
}

/// Keyboard standing in for the GPIO bank.
#[derive(Clone, Copy)]
struct SimGpio;

impl GpioBank for SimGpio {
    fn configure_pull_up_input(&mut self, pin: u8) {
        log::debug!("GPIO{pin}: pulled-up input");
    }

    fn is_high(&mut self, pin: u8) -> bool {
        pin != JOYSTICK_BUTTON_PIN || !JOYSTICK_PRESSED.load(Ordering::Relaxed)
    }

    fn set_irq_enabled(&mut self, pin: u8, events: EventMask, enabled: bool) {
        log::debug!("GPIO{pin}: {events:?} interrupt enabled: {enabled}");
    }

    fn enable_bank_irq(&mut self) {
        log::info!("GPIO bank interrupt enabled");
    }
}

#[derive(Default)]
struct SimAdc {
    selected: u8,
}

impl AnalogInput for SimAdc {
    fn configure_channel(&mut self, channel: u8) {
        log::debug!("ADC channel {channel} configured");
    }

    fn select_channel(&mut self, channel: u8) {
        self.selected = channel;
    }

    fn read(&mut self) -> u16 {
        if self.selected == JOYSTICK_X_CHANNEL {
            JOYSTICK_X.load(Ordering::Relaxed)
        } else {
            JOYSTICK_Y.load(Ordering::Relaxed)
        }
    }
}

#[derive(Clone, Copy)]
struct SimClock;

impl DelayMs<u32> for SimClock {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        now()
    }
}

#[derive(Default)]
struct SimPwm {
    wrap: u16,
}

impl PwmOutput for SimPwm {
    fn set_wrap(&mut self, wrap: u16) {
        self.wrap = wrap;
    }

    fn set_clock_divider(&mut self, divider: U8F8) {
        log::trace!("PWM divider {divider}");
    }

    fn set_level(&mut self, level: u16) {
        let sounding = if level == 0 { 0 } else { self.wrap as u32 };
        SOUNDING_WRAP.store(sounding, Ordering::Relaxed);
    }

    fn set_enabled(&mut self, enabled: bool) {
        log::trace!("PWM enabled: {enabled}");
    }
}

#[derive(Default)]
struct Screen {
    message: String,
    status: String,
}

struct SimConsole {
    screen: Arc<Mutex<Screen>>,
}

impl Console for SimConsole {
    fn write_line(&mut self, line: &str) {
        let Ok(mut screen) = self.screen.lock() else {
            return;
        };

        if line.starts_with("X: ") {
            screen.status = line.to_string();
        } else {
            println!("{line}");
            screen.message = line.to_string();
        }
    }
}

fn press(pin: u8) {
    // What the GPIO interrupt would do on a falling edge.
    DISPATCHER.dispatch(pin, EventMask::EDGE_FALL, now());
}

fn nudge(axis: &AtomicU16, up: bool) {
    let value = axis.load(Ordering::Relaxed);
    let value = if up {
        value.saturating_add(AXIS_STEP).min(ADC_FULL_SCALE)
    } else {
        value.saturating_sub(AXIS_STEP)
    };
    axis.store(value, Ordering::Relaxed);
}

fn main() -> Result<(), core::convert::Infallible> {
    Builder::from_env(Env::default().default_filter_or(LevelFilter::Info.to_string())).init();

    let mut gpio = SimGpio;
    let button_a = Button::new(&mut gpio, BUTTON_A_PIN);
    let button_b = Button::new(&mut gpio, BUTTON_B_PIN);
    button_a.attach_callback(&DISPATCHER, &mut gpio, &FLAGS.next_melody);
    button_b.attach_callback(&DISPATCHER, &mut gpio, &FLAGS.play_pause);

    let player = match Player::new(&CATALOG, PlayerSettings::default()) {
        Ok(player) => player,
        Err(err) => {
            log::error!("cannot start the player: {err:?}");
            std::process::exit(1);
        }
    };

    let screen = Arc::new(Mutex::new(Screen::default()));
    let console = SimConsole {
        screen: screen.clone(),
    };

    thread::spawn(move || {
        let joystick = Joystick::new(SimAdc::default(), gpio, JOYSTICK_BUTTON_PIN);
        let buzzer = Buzzer::new(SimPwm::default(), SimClock, SYSTEM_CLOCK_HZ);

        MelodyInterface::new(&FLAGS, player, joystick, buzzer, SimClock, console).start();
    });

    let display_size = Size::new(216, 48);
    let mut display = SimulatorDisplay::<BinaryColor>::new(display_size);
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

    let output_settings = OutputSettingsBuilder::new()
        .theme(BinaryColorTheme::OledWhite)
        .scale(4)
        .pixel_spacing(1)
        .build();
    let mut window = Window::new("joytone", &output_settings);

    'main: loop {
        Rectangle::new(Point::zero(), display_size)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut display)?;

        if let Ok(screen) = screen.lock() {
            Text::new(&screen.message, Point::new(0, 8), style).draw(&mut display)?;
            Text::new(&screen.status, Point::new(0, 20), style).draw(&mut display)?;
        }

        // Pitch bend bar, filled while a tone sounds.
        let x = JOYSTICK_X.load(Ordering::Relaxed) as u32;
        let bar = Size::new(1 + x * (display_size.width - 1) / ADC_FULL_SCALE as u32, 8);
        let bar_style = if SOUNDING_WRAP.load(Ordering::Relaxed) != 0 {
            PrimitiveStyle::with_fill(BinaryColor::On)
        } else {
            PrimitiveStyle::with_stroke(BinaryColor::On, 1)
        };
        Rectangle::new(Point::new(0, 34), bar)
            .into_styled(bar_style)
            .draw(&mut display)?;

        window.update(&display);

        for event in window.events() {
            match event {
                SimulatorEvent::KeyDown {
                    keycode,
                    keymod: _,
                    repeat,
                } => match (keycode, repeat) {
                    (Keycode::A, false) => press(BUTTON_A_PIN),
                    (Keycode::B, false) => press(BUTTON_B_PIN),
                    (Keycode::Space, false) => JOYSTICK_PRESSED.store(true, Ordering::Relaxed),
                    (Keycode::Right, _) => nudge(&JOYSTICK_X, true),
                    (Keycode::Left, _) => nudge(&JOYSTICK_X, false),
                    (Keycode::Up, _) => nudge(&JOYSTICK_Y, true),
                    (Keycode::Down, _) => nudge(&JOYSTICK_Y, false),
                    _ => (),
                },
                SimulatorEvent::KeyUp {
                    keycode: Keycode::Space,
                    ..
                } => JOYSTICK_PRESSED.store(false, Ordering::Relaxed),
                SimulatorEvent::Quit => break 'main,
                _ => (),
            }
        }

        thread::sleep(Duration::from_millis(25));
    }

    Ok(())
}
