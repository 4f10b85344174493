mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{init_logger, FakeAdc, FakeClock, FakeConsole, FakeGpio, FakeTone};
use joytone::consts::{PlayerSettings, JOYSTICK_BUTTON_PIN};
use joytone::interface::{Interface, MelodyInterface, BANNER};
use joytone::irq::InputFlags;
use joytone::joystick::Joystick;
use joytone::melody::{Melody, CATALOG};
use joytone::player::{PlaybackState, Player};
use joytone::status::{Status, StatusReporter};

use common::ms;
use joytone::io::Duration;

type TestInterface = MelodyInterface<FakeTone, FakeClock, FakeAdc, FakeGpio, FakeConsole>;

static SHORT: [Melody; 2] = [
    Melody::new("one", &[440, 660, 880], &[300, 300, 300]),
    Melody::new("two", &[220, 330], &[150, 150]),
];

fn interface(
    flags: &'static InputFlags,
    catalog: &'static [Melody],
    tone: FakeTone,
    time: Rc<Cell<u64>>,
) -> (TestInterface, Rc<RefCell<Vec<String>>>) {
    let console = FakeConsole::default();
    let lines = console.lines.clone();
    let player = Player::new(catalog, PlayerSettings::default()).unwrap();
    let joystick = Joystick::new(FakeAdc::new(2048, 1000), FakeGpio::default(), JOYSTICK_BUTTON_PIN);

    (
        MelodyInterface::new(flags, player, joystick, tone, FakeClock::new(time), console),
        lines,
    )
}

#[test]
fn test_banner_and_selection_announcement() {
    init_logger();

    static FLAGS: InputFlags = InputFlags::new();
    let time = Rc::new(Cell::new(0));
    let (mut interface, lines) = interface(&FLAGS, &CATALOG, FakeTone::new(time.clone()), time);

    assert_eq!(lines.borrow()[..BANNER.len()], BANNER.map(String::from));

    FLAGS.next_melody.set();
    interface.run();

    assert!(!FLAGS.next_melody.is_set());
    assert!(lines
        .borrow()
        .contains(&"Selected melody: Für Elise".to_string()));
    assert_eq!(interface.player().selected(), 1);
}

#[test]
fn test_status_line_is_rate_limited() {
    static FLAGS: InputFlags = InputFlags::new();
    let time = Rc::new(Cell::new(0));
    let (mut interface, lines) = interface(&FLAGS, &CATALOG, FakeTone::new(time.clone()), time);

    // Each cycle sleeps 10 ms; the 11th starts at 100 ms.
    for _ in 0..11 {
        interface.run();
    }

    let status: Vec<String> = lines
        .borrow()
        .iter()
        .filter(|line| line.starts_with("X: "))
        .cloned()
        .collect();
    assert_eq!(
        status,
        vec![
            "X: 2048 | Y: 1000 | Freq: 0    Hz".to_string(),
            "X: 2048 | Y: 1000 | Freq: 0    Hz".to_string(),
        ]
    );
}

#[test]
fn test_next_melody_during_playback() {
    init_logger();

    static FLAGS: InputFlags = InputFlags::new();
    let time = Rc::new(Cell::new(0));
    let mut tone = FakeTone::new(time.clone());

    // Button A goes down while the very first note is sounding.
    let pressed = Rc::new(Cell::new(false));
    let hook_pressed = pressed.clone();
    tone.during_tone = Some(Box::new(move || {
        if !hook_pressed.get() {
            hook_pressed.set(true);
            FLAGS.next_melody.set();
        }
    }));

    let (mut interface, _) = interface(&FLAGS, &SHORT, tone, time);

    FLAGS.play_pause.set();
    interface.run();

    // The note in progress played out in full.
    assert!(pressed.get());
    assert_eq!(interface.tone().emitted, vec![(440, 300)]);
    assert_eq!(interface.player().state(), PlaybackState::Playing);

    interface.run();
    assert_eq!(interface.player().state(), PlaybackState::Paused);
    assert_eq!(interface.player().selected(), 1);
    assert_eq!(interface.player().current_note(), 0);

    for _ in 0..5 {
        interface.run();
    }
    assert_eq!(interface.tone().emitted.len(), 1);

    FLAGS.play_pause.set();
    interface.run();
    assert_eq!(interface.tone().emitted, vec![(440, 300), (220, 150)]);
}

#[test]
fn test_status_formatting() {
    let status = Status {
        x: 5,
        y: 12,
        frequency: 440,
    };
    assert_eq!(status.to_string(), "X: 5    | Y: 12   | Freq: 440  Hz");

    let wide = Status {
        x: 4095,
        y: 40950,
        frequency: 12_345,
    };
    assert_eq!(wide.to_string(), "X: 4095 | Y: 40950 | Freq: 12345 Hz");
}

#[test]
fn test_status_reporter() {
    let mut reporter = StatusReporter::new(Duration::millis(100));

    assert!(reporter.poll(ms(0)));
    assert!(!reporter.poll(ms(50)));
    assert!(!reporter.poll(ms(99)));
    assert!(reporter.poll(ms(100)));
    assert!(!reporter.poll(ms(150)));
    assert!(reporter.poll(ms(400)));
}
