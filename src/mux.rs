//! Time-division multiplexer for the shared LED driver lines.
//!
//! The twelve face LEDs are wired as three color rails (green, yellow, red)
//! across four shared direction lines, plus one dedicated power-LED line.
//! Only one color rail may sink current at a time; the multiplexer rotates
//! through the rails fast enough that the eye blends them. The rotation has
//! four slots: one per rail and a fourth blanking slot that drives nothing,
//! which caps the duty cycle of every LED at one quarter.

use crate::bitmap::LedBitmap;

/// Multiplex slots per rotation: three color rails plus the blanking slot.
pub const CHANNEL_COUNT: u16 = 4;
/// Frame-counter range before the factor divisor is applied.
pub const COUNTER_WRAP: u16 = 1000;
/// Data-line bit driving the power indicator LED.
pub const POWER_LED_BIT: u8 = 0x10;
/// Default throttle: produce a frame on every tick.
pub const MUX_FACTOR: u8 = 1;

/// One multiplex output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct Frame {
    /// Color rail to activate (0 = green, 1 = yellow, 2 = red), or `None`
    /// for the blanking slot.
    pub select: Option<u8>,
    /// Levels for the shared data lines: direction bits 0..=3 plus the
    /// power-LED bit.
    pub data: u8,
}

impl Frame {
    /// The blanking frame: no rail selected, every data line low.
    pub const BLANK: Self = Self {
        select: None,
        data: 0,
    };
}

/// Rotates the multiplex slots and extracts one frame per update.
///
/// Lives entirely in the tick context; nothing else reads its counters.
pub struct Multiplexer {
    /// Free-running frame counter, wraps at `COUNTER_WRAP / factor`.
    n: u16,
    /// Ticks skipped since the last frame.
    skipped: u8,
    /// Frames are produced every `factor`-th tick.
    factor: u8,
}

impl Multiplexer {
    /// Creates a multiplexer producing a frame every `factor`-th tick.
    /// `factor` must be at least 1.
    pub const fn new(factor: u8) -> Self {
        assert!(factor >= 1);
        Self {
            n: 0,
            skipped: 0,
            factor,
        }
    }

    /// Advances one tick; returns the frame to drive, or `None` on ticks
    /// gated out by the factor divisor.
    pub fn tick(&mut self, bitmap: LedBitmap, power_led: bool) -> Option<Frame> {
        self.skipped += 1;
        if self.skipped < self.factor {
            return None;
        }
        self.skipped = 0;

        let index = self.n % CHANNEL_COUNT;
        let frame = if index < CHANNEL_COUNT - 1 {
            let power_bit = if power_led { POWER_LED_BIT } else { 0 };
            Frame {
                select: Some(index as u8),
                data: bitmap.nibble(index as u8) | power_bit,
            }
        } else {
            Frame::BLANK
        };

        self.n += 1;
        if self.n >= COUNTER_WRAP / u16::from(self.factor) {
            self.n = 0;
        }
        Some(frame)
    }
}
