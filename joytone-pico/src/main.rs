#![no_std]
#![no_main]

#[link_section = ".boot2"]
#[no_mangle]
#[used]
pub static BOOT2_FIRMWARE: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

use core::cell::RefCell;

use cortex_m::interrupt::Mutex;
use defmt::*;
use defmt_rtt as _;
use panic_probe as _;
use rp_pico::{
    entry,
    hal::{
        adc::AdcPin,
        clocks::{init_clocks_and_plls, Clock},
        gpio,
        pac::{self, interrupt},
        pwm::Slices,
        sio::Sio,
        Adc, Timer, Watchdog,
    },
};

use joytone::{
    button::Button,
    buzzer::Buzzer,
    consts::{
        PlayerSettings, BUTTON_A_PIN, BUTTON_B_PIN, JOYSTICK_BUTTON_PIN, SYSTEM_CLOCK_HZ,
    },
    interface::{Interface, MelodyInterface},
    irq::{InputFlags, IrqDispatcher},
    joystick::Joystick,
    melody::CATALOG,
    player::Player,
};

use crate::io::{DefmtConsole, PicoAdc, PicoClock, PicoGpio, PicoPwm, SharedGpio, GPIO};

mod io;

static DISPATCHER: IrqDispatcher = IrqDispatcher::new();
static FLAGS: InputFlags = InputFlags::new();
static TIMER: Mutex<RefCell<Option<Timer>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    let mut pac = unwrap!(pac::Peripherals::take());
    let sio = Sio::new(pac.SIO);

    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = unwrap!(init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok());

    if clocks.system_clock.freq() != SYSTEM_CLOCK_HZ {
        warn!(
            "system clock is {} Hz, tones will be off",
            clocks.system_clock.freq().to_Hz()
        );
    }

    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let clock = PicoClock::new(timer);

    let pins = gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    info!("Setting up inputs.");

    cortex_m::interrupt::free(|cs| {
        TIMER.borrow(cs).replace(Some(timer));
        GPIO.borrow(cs).replace(Some(PicoGpio::new([
            pins.gpio5.into_pull_up_input().into_dyn_pin(),
            pins.gpio6.into_pull_up_input().into_dyn_pin(),
            pins.gpio22.into_pull_up_input().into_dyn_pin(),
        ])));
    });

    let mut gpio = SharedGpio;

    let button_a = Button::new(&mut gpio, BUTTON_A_PIN);
    let button_b = Button::new(&mut gpio, BUTTON_B_PIN);
    button_a.attach_callback(&DISPATCHER, &mut gpio, &FLAGS.next_melody);
    button_b.attach_callback(&DISPATCHER, &mut gpio, &FLAGS.play_pause);

    let adc = Adc::new(pac.ADC, &mut pac.RESETS);
    let axes = [
        unwrap!(AdcPin::new(pins.gpio26.reconfigure().into_dyn_pin()).ok()),
        unwrap!(AdcPin::new(pins.gpio27.reconfigure().into_dyn_pin()).ok()),
    ];
    let joystick = Joystick::new(PicoAdc::new(adc, axes), gpio, JOYSTICK_BUTTON_PIN);

    info!("Setting up the buzzer.");

    let slices = Slices::new(pac.PWM, &mut pac.RESETS);
    let mut buzzer_slice = slices.pwm2;
    let _buzzer_pin = buzzer_slice.channel_b.output_to(pins.gpio21);
    let buzzer = Buzzer::new(PicoPwm::new(buzzer_slice), clock, SYSTEM_CLOCK_HZ);

    let player = unwrap!(Player::new(&CATALOG, PlayerSettings::default()));

    info!("Start polling loop.");

    MelodyInterface::new(&FLAGS, player, joystick, buzzer, clock, DefmtConsole).start()
}

#[interrupt]
fn IO_IRQ_BANK0() {
    let (now, pending) = cortex_m::interrupt::free(|cs| {
        let now = TIMER.borrow(cs).borrow().as_ref().map(|timer| timer.get_counter());
        let pending = GPIO
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .map(|gpio| gpio.take_pending())
            .unwrap_or_default();

        (now, pending)
    });

    let Some(now) = now else {
        return;
    };

    for (pin, events) in pending {
        DISPATCHER.dispatch(pin, events, now);
    }
}
