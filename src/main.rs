//! Firmware for a battery-powered four-direction LED waymark.
//!
//! # Overview
//!
//! This firmware controls a low-power trail waymark featuring:
//! - Four directional LED arms (South/East/North/West), each with a green,
//!   a yellow and a red LED, time-multiplexed over shared driver lines
//! - A repeating breathing/blink color pattern with amber handovers
//! - A single power button: hold to power off, press to wake
//! - STOP-mode sleep between power cycles, woken by the button's EXTI line
//!
//! # Hardware
//!
//! - **MCU**: STM32L031G6U6 (Cortex-M0+, ultra-low-power)
//! - **Battery**: single coin cell
//! - **LEDs**: 12 directional (4 arms x 3 colors) + 1 power indicator
//! - **Matrix wiring**: 5 shared data lines, 3 active-low color rails
//!
//! # Power Management
//!
//! Shutdown takes a deliberate gesture: hold the button through a full
//! countdown (the power LED acknowledges), release, and leave it released
//! through a second countdown. The tick loop then blanks the LED lines and
//! the sleep task stops the core in STOP mode with only the button's EXTI
//! line armed. A button press wakes the device and restarts the pattern.
//!
//! # Timing
//!
//! A 4096 Hz tick loop is the sole time base; the multiplexer, the
//! animation and the button debounce all count its ticks. The MSI oscillator
//! runs at 4.194 MHz so the tick period is comfortably met while active;
//! STOP mode gates all clocks until the wake edge.
//!
//! # Module Organization
//!
//! - [`waymark::display`] - LED line driver and the periodic tick loop
//! - [`waymark::animation`] - light-pattern state machine
//! - [`waymark::power`] - power-button gesture state machine
//! - [`waymark::mux`] - time-division multiplexer
//! - [`waymark::sleep`] - STOP-mode entry and the wake interrupt
//! - [`waymark::hardware`] - pin mappings and peripheral initialization

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_stm32::Config;
use {defmt_rtt as _, panic_probe as _};

use waymark::display;
use waymark::hardware::Peripherals;
use waymark::sleep;

/// Creates the clock configuration for the waymark.
///
/// # Clock Settings
///
/// - **MSI**: 4.194 MHz, fast enough for the 4096 Hz tick loop
/// - **System clock**: MSI (no PLL)
///
/// Everything else stays at the reset defaults; the device keeps no
/// wall-clock time, so no LSE crystal is configured.
fn create_clock_config() -> embassy_stm32::rcc::Config {
    embassy_stm32::rcc::Config {
        msi: Some(embassy_stm32::rcc::MSIRange::RANGE4M),
        sys: embassy_stm32::rcc::Sysclk::MSI,
        ..Default::default()
    }
}

/// Main entry point for the waymark firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks (4.194 MHz MSI)
/// 2. Initialize STM32 peripherals
/// 3. Set up the wake-interrupt plumbing (line stays masked until sleep)
/// 4. Initialize GPIO
/// 5. Spawn the sleep task
/// 6. Run the tick loop
///
/// # Spawned Tasks
///
/// - **sleep_task**: stops the core after a completed shutdown gesture
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_clock_config();

    let p = embassy_stm32::init(config);

    #[cfg(feature = "debug-mode")]
    defmt::info!("waymark firmware starting...");

    sleep::setup_wake();

    let peripherals = Peripherals::new(p);

    spawner.spawn(sleep::sleep_task()).unwrap();

    #[cfg(feature = "debug-mode")]
    defmt::info!("entering tick loop...");

    display::run(peripherals).await
}
