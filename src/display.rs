//! LED line driver and the periodic tick loop.
//!
//! The tick loop is the device's only time base. Every tick it advances the
//! animation machine (unless a shutdown is pending), advances the power
//! gesture machine with a fresh button sample, and drives one multiplex
//! frame onto the LED lines. When the gesture machine commits a shutdown the
//! loop drives an explicit blanking frame and hands over to the sleep task.

use embassy_stm32::gpio::Level;
use embassy_time::{Duration, Timer};

use crate::animation::Animation;
use crate::hardware::{DATA_COUNT, OutputArray, Peripherals, SELECT_COUNT};
use crate::mux::{Frame, MUX_FACTOR, Multiplexer};
use crate::power::{PowerButton, PowerRequest};
use crate::sleep;
use crate::state::SHARED;

/// Tick rate of the loop. 4096 Hz divides the 32.768 kHz time base exactly
/// and gives a 1024 Hz refresh per color rail, far above flicker fusion.
pub const TICK_RATE_HZ: u64 = 4096;

/// Period of one tick.
const TICK_PERIOD: Duration = Duration::from_hz(TICK_RATE_HZ);

/// Driver for the multiplexed LED lines.
pub struct LedDriver {
    selects: OutputArray<'static, SELECT_COUNT>,
    data: OutputArray<'static, DATA_COUNT>,
}

impl LedDriver {
    pub fn new(
        selects: OutputArray<'static, SELECT_COUNT>,
        data: OutputArray<'static, DATA_COUNT>,
    ) -> Self {
        Self { selects, data }
    }

    /// Drives one multiplex frame onto the lines.
    ///
    /// The data lines are cleared before the select rails change, so a stale
    /// pattern never ghosts onto the newly selected rail, and all rails are
    /// deselected before one is activated, so two rails are never active at
    /// the same instant.
    pub fn drive(&mut self, frame: Frame) {
        self.data.set_all(Level::Low);
        self.selects.set_all(Level::High);
        if let Some(rail) = frame.select {
            self.selects.set_level(usize::from(rail), Level::Low);
            self.data.set_from_bits(frame.data);
        }
    }
}

/// Runs the periodic tick loop. Never returns.
///
/// While a shutdown is pending the animation machine is not called, the
/// gesture machine idles, and the multiplexer keeps rotating over the
/// blanked face until the sleep task stops the core.
pub async fn run(peripherals: Peripherals) -> ! {
    let Peripherals {
        selects,
        data,
        button,
    } = peripherals;

    let mut driver = LedDriver::new(selects, data);
    let mut animation = Animation::new();
    let mut power_button = PowerButton::new();
    let mut mux = Multiplexer::new(MUX_FACTOR);

    loop {
        let powering_down = SHARED.power_request() == PowerRequest::PowerDown;

        if !powering_down {
            animation.tick(&SHARED);
        }
        power_button.tick(&SHARED, button.is_low());

        if let Some(frame) = mux.tick(SHARED.led_bitmap(), SHARED.power_led()) {
            driver.drive(frame);
        }

        if !powering_down && SHARED.power_request() == PowerRequest::PowerDown {
            // The gesture machine committed the shutdown on this tick. Blank
            // the lines before the sleep task is allowed to stop the core.
            driver.drive(Frame::BLANK);

            #[cfg(feature = "debug-mode")]
            defmt::info!("shutdown gesture complete, requesting sleep");

            sleep::request_sleep();
        }

        Timer::after(TICK_PERIOD).await;
    }
}
