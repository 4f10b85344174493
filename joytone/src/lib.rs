#![no_std]

pub mod button;
pub mod buzzer;
pub mod consts;
pub mod debouncer;
pub mod interface;
pub mod io;
pub mod irq;
pub mod joystick;
pub mod melody;
pub mod player;
pub mod status;
