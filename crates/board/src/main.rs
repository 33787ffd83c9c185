//! BlackPill bring-up binary.
//!
//! Boots the WeAct BlackPill (STM32F411CE) on the crystal clock plan and
//! blinks the on-board LED as a liveness beacon. Serves as the smallest
//! on-target proof that a clock plan translated by
//! [`board::hardware::build_embassy_config`] actually runs the core.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_time::Timer;

use defmt_rtt as _;
use panic_probe as _;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let plan = board::blackpill_f411ce::default_hardware_plan(false);
    defmt::info!(
        "BlackPill bring-up: sysclk={=u32}Hz ahb={=u32}Hz",
        plan.sysclk_hz(),
        plan.ahb_hz()
    );

    let p = embassy_stm32::init(board::hardware::build_embassy_config(&plan));
    defmt::info!("clocks up, entering heartbeat");

    // PC13 drives the LED through its cathode; low is lit.
    let mut led = Output::new(p.PC13, Level::High, Speed::Low);
    loop {
        led.set_low();
        Timer::after_millis(100).await;
        led.set_high();
        Timer::after_millis(900).await;
    }
}
