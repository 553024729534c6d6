//! Hardware abstraction and peripheral initialization.
//!
//! This module defines the pin mappings and peripheral initialization
//! for the waymark hardware.
//!
//! # Pin Assignments
//!
//! ## LED matrix (4 direction arms x 3 colors, common data lines)
//! - **PB0**: South direction data line
//! - **PB1**: East direction data line
//! - **PB2**: North direction data line
//! - **PB3**: West direction data line
//! - **PB4**: Power indicator LED data line
//! - **PA4**: GREEN_N - Active-low select for the green color rail
//! - **PA5**: YELLOW_N - Active-low select for the yellow color rail
//! - **PA6**: RED_N - Active-low select for the red color rail
//!
//! The direction lines source current into whichever color rail is pulled
//! low; with every select rail high no LED can conduct regardless of the
//! data lines.
//!
//! ## Power button
//! - **PA0**: POWER BUTTON - Input with pull-up, active-low; doubles as the
//!   EXTI line 0 wake source (see the `sleep` module)
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK

use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};

/// Number of color select rails (the fourth multiplex slot drives nothing).
pub const SELECT_COUNT: usize = 3;
/// Number of shared data lines: four direction arms plus the power LED.
pub const DATA_COUNT: usize = 5;

/// A fixed group of output lines driven together.
pub struct OutputArray<'a, const N: usize>([Output<'a>; N]);

impl<'a, const N: usize> OutputArray<'a, N> {
    pub fn new(outputs: [Output<'a>; N]) -> Self {
        Self(outputs)
    }

    /// Drives every line in the group to `level`.
    pub fn set_all(&mut self, level: Level) {
        for output in &mut self.0 {
            output.set_level(level);
        }
    }

    /// Drives the single line at `index` to `level`.
    pub fn set_level(&mut self, index: usize, level: Level) {
        self.0[index].set_level(level);
    }

    /// Drives the lines from the low `N` bits of `bits`, line 0 from bit 0.
    pub fn set_from_bits(&mut self, mut bits: u8) {
        for output in &mut self.0 {
            let level = if bits & 1 == 1 {
                Level::High
            } else {
                Level::Low
            };
            output.set_level(level);
            bits >>= 1;
        }
    }
}

/// Top-level peripheral container for the waymark.
///
/// Owns every line the tick loop drives or samples.
pub struct Peripherals {
    /// Active-low color rail selects (green, yellow, red)
    pub selects: OutputArray<'static, SELECT_COUNT>,
    /// Shared data lines (South, East, North, West, power LED)
    pub data: OutputArray<'static, DATA_COUNT>,
    /// Power button input (pull-up, low when pressed)
    pub button: Input<'static>,
}

impl Peripherals {
    /// Initializes all peripherals from the STM32 peripheral singleton.
    ///
    /// # Initial GPIO States
    ///
    /// - PA4/PA5/PA6 (selects): High (every color rail off)
    /// - PB0..PB4 (data lines): Low (dark)
    /// - PA0 (button): pull-up enabled
    pub fn new(p: embassy_stm32::Peripherals) -> Self {
        Self {
            selects: OutputArray::new([
                Output::new(p.PA4, Level::High, Speed::Low),
                Output::new(p.PA5, Level::High, Speed::Low),
                Output::new(p.PA6, Level::High, Speed::Low),
            ]),
            data: OutputArray::new([
                Output::new(p.PB0, Level::Low, Speed::Low),
                Output::new(p.PB1, Level::Low, Speed::Low),
                Output::new(p.PB2, Level::Low, Speed::Low),
                Output::new(p.PB3, Level::Low, Speed::Low),
                Output::new(p.PB4, Level::Low, Speed::Low),
            ]),
            button: Input::new(p.PA0, Pull::Up),
        }
    }
}
